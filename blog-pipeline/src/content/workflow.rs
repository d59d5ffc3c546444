//! Orchestration for tone derivation, daily generation and batches.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use blog_pipeline_sdk::{
    log_file_saved, log_info, log_stage_complete_console, log_stage_start_console,
    log_state_file, log_warning,
};

use crate::config::Config;
use crate::content::batch::{BatchRange, BatchRunner, BatchSummary};
use crate::content::cli::{BatchArgs, DailyArgs, ToneArgs};
use crate::content::daily::{resolve_day, DailyGenerator, DailyOptions, DailyOutcome, DailyState};
use crate::content::tone::{derive_tone_guide, ToneDerivation, ToneOverrides};
use crate::content::types::ToneStyleGuide;
use crate::content::writer::DayWriter;
use crate::interactive::{ask_number, confirm, Prompter, StdinPrompter};
use crate::planner::types::{InitialPipelineResult, SerpData, PLAN_DAYS};
use crate::render::{publish_post, TemplateStore};
use crate::workflow_utils::files::{
    INITIAL_PIPELINE_RESULT, SERP_DATA, TONE_ANALYSIS, TONE_STYLE_GUIDE,
};
use crate::workflow_utils::{execute_step, read_prerequisite, write_json_atomic, StageRunner};

fn resolve_output_dir(arg: Option<PathBuf>, config: &Config) -> PathBuf {
    arg.unwrap_or_else(|| config.output_dir.clone())
}

/// Plan and guide every post generation run needs.
pub fn load_generation_inputs(output_dir: &Path) -> Result<(InitialPipelineResult, ToneStyleGuide)> {
    let plan: InitialPipelineResult = read_prerequisite(
        &output_dir.join(INITIAL_PIPELINE_RESULT),
        "run initial-pipeline first",
    )?;
    let guide: ToneStyleGuide =
        read_prerequisite(&output_dir.join(TONE_STYLE_GUIDE), "run tone-style first")?;
    Ok((plan, guide.normalized()))
}

/// Derive the guide from `serp_data.json` and persist analysis and guide.
pub async fn run_tone_derivation(
    runner: &StageRunner,
    output_dir: &Path,
    overrides: &ToneOverrides,
) -> Result<ToneDerivation> {
    let serp: SerpData =
        read_prerequisite(&output_dir.join(SERP_DATA), "run initial-pipeline first")?;

    let derivation = execute_step(1, "Tone Derivation", 1, || async move {
        log_stage_start_console!(1, "Tone Derivation", "Analyzing competing posts");
        let derivation = derive_tone_guide(runner, &serp, overrides).await?;
        if derivation.used_default_analysis {
            log_warning!("분석 결과를 해석하지 못해 기본 분석을 사용합니다");
        }
        if derivation.used_default_guide {
            log_warning!("가이드 생성에 실패해 기본 가이드를 사용합니다");
        }
        log_info!(
            "톤: {} / {}",
            derivation.guide.tone_guide.personality,
            derivation.guide.tone_guide.formality
        );
        log_stage_complete_console!(1);
        anyhow::Ok(derivation)
    })
    .await?;

    let analysis_path = output_dir.join(TONE_ANALYSIS);
    write_json_atomic(&analysis_path, &derivation.analysis)
        .with_context(|| format!("Failed to write {}", analysis_path.display()))?;
    log_file_saved!(analysis_path.display());

    let guide_path = output_dir.join(TONE_STYLE_GUIDE);
    write_json_atomic(&guide_path, &derivation.guide)
        .with_context(|| format!("Failed to write {}", guide_path.display()))?;
    log_state_file!(1, guide_path.display(), "Tone & style guide");
    log_file_saved!(guide_path.display());

    Ok(derivation)
}

/// Entry point for the `tone-style` binary.
pub async fn run_tone_style(args: ToneArgs, config: Config) -> Result<()> {
    let output_dir = resolve_output_dir(args.output_dir, &config);
    let overrides = ToneOverrides {
        tone: args.tone,
        formality: args.formality,
        length: args.length,
    };
    let runner = StageRunner::from_config(&config).context("Failed to build text generator")?;
    run_tone_derivation(&runner, &output_dir, &overrides).await?;
    log_info!("다음 단계: daily-content 또는 batch-posts");
    Ok(())
}

/// Generate one day and optionally render it.
pub async fn run_daily(
    runner: StageRunner,
    prompter: &dyn Prompter,
    output_dir: &Path,
    templates: &TemplateStore,
    args: &DailyArgs,
) -> Result<DailyOutcome> {
    let (plan, guide) = load_generation_inputs(output_dir)?;
    let state = DailyState::load(output_dir).context("Failed to read resume state")?;
    let day = resolve_day(args.day, args.auto, &state, prompter)?;

    let generator = DailyGenerator::new(DayWriter::new(runner), output_dir);
    let options = DailyOptions {
        use_trends: !args.no_trends,
        regenerate: args.regenerate,
    };

    let total = PLAN_DAYS;
    let content_plan = &plan.content_plan;
    let guide = &guide;
    let outcome = execute_step(day as usize, "Daily Content", total, || async move {
        anyhow::Ok(generator.generate(content_plan, guide, day, options).await?)
    })
    .await?;

    match &outcome {
        DailyOutcome::Skipped { day, path } => {
            log_info!(
                "Day {}는 이미 생성되어 있습니다 ({}). 다시 만들려면 --regenerate",
                day,
                path.display()
            );
        }
        DailyOutcome::Generated { day, path, outcome } => {
            log_info!(
                "Day {} 완료: {} ({}자)",
                day,
                outcome.post.title,
                outcome.post.full_text_length
            );
            log_file_saved!(path.display());
            if let Some(platform) = &args.platform {
                let published = publish_post(output_dir, templates, &outcome.post, platform)
                    .with_context(|| format!("Failed to publish day {} to {}", day, platform))?;
                log_file_saved!(published.markup_path.display());
            }
        }
    }
    Ok(outcome)
}

/// Entry point for the `daily-content` binary.
pub async fn run_daily_content(args: DailyArgs, config: Config) -> Result<()> {
    let output_dir = resolve_output_dir(args.output_dir.clone(), &config);
    let runner = StageRunner::from_config(&config).context("Failed to build text generator")?;
    let templates = TemplateStore::load_dir(&config.policy.templates_dir);
    run_daily(runner, &StdinPrompter, &output_dir, &templates, &args).await?;
    Ok(())
}

fn resolve_range(args: &BatchArgs, state: &DailyState, prompter: &dyn Prompter) -> Result<BatchRange> {
    let start = match args.start {
        Some(start) => start,
        None => ask_number(prompter, "시작 Day", state.resume_day())?,
    };
    let end = match args.end {
        Some(end) => end,
        None => ask_number(prompter, "종료 Day", PLAN_DAYS as u32)?,
    };
    Ok(BatchRange::new(start, end)?)
}

/// Generate a range of days. `None` when the user declines.
pub async fn run_batch(
    runner: StageRunner,
    prompter: &dyn Prompter,
    output_dir: &Path,
    args: &BatchArgs,
    failure_limit: usize,
) -> Result<Option<BatchSummary>> {
    let (plan, guide) = load_generation_inputs(output_dir)?;
    let state = DailyState::load(output_dir).context("Failed to read resume state")?;
    let range = resolve_range(args, &state, prompter)?;

    log_info!(
        "Day {}~{} ({}개) 생성, 연속 실패 {}회에서 중단",
        range.start,
        range.end,
        range.len(),
        failure_limit
    );
    if !args.yes && !confirm(prompter, "진행할까요?")? {
        log_info!("취소했습니다");
        return Ok(None);
    }

    let batch = BatchRunner::new(DayWriter::new(runner), output_dir, failure_limit);
    let summary = batch.run(&plan.content_plan, &guide, range).await?;
    if summary.aborted {
        log_warning!(
            "연속 실패로 중단됨: {}/{}일 시도",
            summary.total_count,
            range.len()
        );
    }
    Ok(Some(summary))
}

/// Entry point for the `batch-posts` binary.
pub async fn run_batch_posts(args: BatchArgs, config: Config) -> Result<()> {
    let output_dir = resolve_output_dir(args.output_dir.clone(), &config);
    let failure_limit = args
        .max_consecutive_failures
        .unwrap_or(config.policy.consecutive_failure_limit);
    if failure_limit == 0 {
        bail!("--max-consecutive-failures must be at least 1");
    }
    let runner = StageRunner::from_config(&config).context("Failed to build text generator")?;
    run_batch(runner, &StdinPrompter, &output_dir, &args, failure_limit).await?;
    Ok(())
}
