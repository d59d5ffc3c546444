//! Orchestration for the initial planning pipeline.
//!
//! Steps run strictly in order; each consumes the previous step's output.
//! Nothing is written until the plan validates, then the full result and
//! the SERP snapshot are saved.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use blog_pipeline_sdk::{log_file_saved, log_info, log_stage_complete_console, log_stage_start_console, log_state_file};

use crate::config::Config;
use crate::error::PipelineError;
use crate::external::{
    HttpPageFetcher, NaverDataLabClient, NaverSearchClient, OfflineSearchClient, PageFetcher,
    SearchClient,
};
use crate::interactive::{Prompter, StdinPrompter};
use crate::planner::cli::{Args, KeywordArgs};
use crate::planner::keywords::expand_keywords;
use crate::planner::step0_refine::IdeaRefiner;
use crate::planner::step1_expand::IdeaExpansionStage;
use crate::planner::step2_score::TopicScoringStage;
use crate::planner::step3_platform::PlatformRecommendationStage;
use crate::planner::step4_serp::{SerpCollector, SerpOptions};
use crate::planner::step5_plan::ContentPlanningStage;
use crate::planner::types::{InitialPipelineResult, KeywordExpansion};
use crate::workflow_utils::files::{INITIAL_PIPELINE_RESULT, KEYWORD_EXPANSION, SERP_DATA};
use crate::workflow_utils::{execute_step, write_json_atomic, StageRunner};

const TOTAL_STEPS: usize = 5;
const PREVIEW_DAYS: usize = 7;

/// Planning configuration derived from CLI arguments and the environment
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub idea: Option<String>,
    pub refine: bool,
    pub output_dir: PathBuf,
    pub serp: SerpOptions,
}

impl PlannerConfig {
    pub fn new(args: Args, config: &Config) -> Self {
        Self {
            idea: args.idea,
            refine: args.refine,
            output_dir: args
                .output_dir
                .unwrap_or_else(|| config.output_dir.clone()),
            serp: SerpOptions::from_policy(&config.policy, args.crawl),
        }
    }
}

/// Collaborators the planner talks to
pub struct PlannerServices {
    pub runner: StageRunner,
    pub search: Arc<dyn SearchClient>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub prompter: Arc<dyn Prompter>,
}

impl PlannerServices {
    pub fn from_config(config: &Config) -> Result<Self> {
        let runner = StageRunner::from_config(config).context("Failed to build text generator")?;
        let search: Arc<dyn SearchClient> = match config.require_search()? {
            Some(credentials) => Arc::new(NaverSearchClient::new(credentials.clone())?),
            None => Arc::new(OfflineSearchClient),
        };
        Ok(Self {
            runner,
            search,
            fetcher: Arc::new(HttpPageFetcher::new()?),
            prompter: Arc::new(StdinPrompter),
        })
    }
}

fn resolve_idea(idea: Option<&str>, prompter: &dyn Prompter) -> Result<String> {
    let idea = match idea {
        Some(idea) => idea.trim().to_string(),
        None => prompter.ask("💡 아이디어를 입력하세요: ")?,
    };
    if idea.is_empty() {
        return Err(PipelineError::validation("initial_pipeline", "idea is empty").into());
    }
    Ok(idea)
}

/// Run every planning step and persist the result.
pub async fn run_planning(
    config: &PlannerConfig,
    services: &PlannerServices,
) -> Result<InitialPipelineResult> {
    let initial_idea = resolve_idea(config.idea.as_deref(), services.prompter.as_ref())?;

    let refined_idea_result = if config.refine {
        log_stage_start_console!(0, "Idea Refinement", "Sharpening the idea through Q&A");
        let refiner = IdeaRefiner::new(services.runner.clone(), services.prompter.clone());
        let refined = refiner
            .refine(&initial_idea)
            .await
            .context("Idea refinement failed")?;
        log_info!("{}번의 질문으로 아이디어를 구체화했습니다", refined.conversation_history.len());
        Some(refined)
    } else {
        None
    };
    let user_idea = refined_idea_result
        .as_ref()
        .map(|r| r.refined_idea.clone())
        .unwrap_or(initial_idea);

    let runner = &services.runner;

    let idea = &user_idea;
    let expanded_topics = execute_step(1, "Idea Expansion", TOTAL_STEPS, || async move {
        log_stage_start_console!(1, "Idea Expansion", "Expanding the idea into topic candidates");
        let expanded = runner.run(&IdeaExpansionStage, idea).await?;
        log_info!("{}개의 주제 후보 생성", expanded.topics.len());
        log_stage_complete_console!(1);
        anyhow::Ok(expanded)
    })
    .await?;

    let candidates = &expanded_topics.topics;
    let scored_topics = execute_step(2, "Topic Scoring", TOTAL_STEPS, || async move {
        log_stage_start_console!(2, "Topic Scoring", "Scoring candidates and selecting a topic");
        let scoring = runner.run(&TopicScoringStage, candidates).await?;
        let selected = &scoring.selected_topic;
        log_info!("최종 선정 주제: {} ({}점)", selected.title, selected.total_score);
        log_stage_complete_console!(2);
        anyhow::Ok(scoring)
    })
    .await?;

    let selected = &scored_topics.selected_topic;
    let platform_recommendation = execute_step(3, "Platform Recommendation", TOTAL_STEPS, || async move {
        log_stage_start_console!(3, "Platform Recommendation", "Choosing where to publish");
        let recommendation = runner.run(&PlatformRecommendationStage, selected).await?;
        log_info!(
            "추천 플랫폼: {} (보조: {})",
            recommendation.primary_platform,
            recommendation.secondary_platforms.join(", ")
        );
        log_stage_complete_console!(3);
        anyhow::Ok(recommendation)
    })
    .await?;

    let primary_platform = &platform_recommendation.primary_platform;
    let serp_data = execute_step(4, "SERP Collection", TOTAL_STEPS, || async move {
        log_stage_start_console!(4, "SERP Collection", "Collecting competing posts");
        let collector = SerpCollector::new(
            services.search.clone(),
            services.fetcher.clone(),
            runner.clone(),
            config.serp.clone(),
        );
        let serp = collector
            .collect(&selected.title, primary_platform)
            .await?;
        log_info!("{}개 블로그 수집 완료", serp.total_results);
        log_stage_complete_console!(4);
        anyhow::Ok(serp)
    })
    .await?;

    let serp = &serp_data;
    let content_plan = execute_step(5, "Content Planning", TOTAL_STEPS, || async move {
        log_stage_start_console!(5, "Content Planning", "Building the 30-day rotation");
        let plan = runner.run(&ContentPlanningStage, serp).await?;
        for item in plan.days.iter().take(PREVIEW_DAYS) {
            log_info!("Day {}: [{}] {}", item.day, item.content_type, item.title);
        }
        log_stage_complete_console!(5);
        anyhow::Ok(plan)
    })
    .await?;

    let result = InitialPipelineResult {
        user_idea,
        refined_idea_result,
        expanded_topics,
        scored_topics,
        platform_recommendation,
        serp_data,
        content_plan,
        generated_at: chrono::Local::now().to_rfc3339(),
    };

    let serp_path = config.output_dir.join(SERP_DATA);
    write_json_atomic(&serp_path, &result.serp_data)
        .with_context(|| format!("Failed to write {}", serp_path.display()))?;
    log_state_file!(4, serp_path.display(), "SERP snapshot");
    log_file_saved!(serp_path.display());

    let result_path = config.output_dir.join(INITIAL_PIPELINE_RESULT);
    write_json_atomic(&result_path, &result)
        .with_context(|| format!("Failed to write {}", result_path.display()))?;
    log_state_file!(5, result_path.display(), "Initial pipeline result");
    log_file_saved!(result_path.display());

    Ok(result)
}

/// Entry point for the `initial-pipeline` binary.
pub async fn run_initial_pipeline(args: Args, config: Config) -> Result<()> {
    let planner_config = PlannerConfig::new(args, &config);
    let services = PlannerServices::from_config(&config)?;
    run_planning(&planner_config, &services).await?;
    log_info!("다음 단계: tone-style 실행 후 daily-content 또는 batch-posts");
    Ok(())
}

/// Expand a seed keyword and persist the result.
pub async fn run_keyword_expansion(
    runner: &StageRunner,
    volumes: &dyn crate::external::VolumeSource,
    seed: &str,
    output_dir: &std::path::Path,
) -> Result<KeywordExpansion> {
    let expansion = execute_step(1, "Keyword Expansion", 1, || async move {
        anyhow::Ok(expand_keywords(runner, volumes, seed).await?)
    })
    .await?;

    let path = output_dir.join(KEYWORD_EXPANSION);
    write_json_atomic(&path, &expansion)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log_state_file!(1, path.display(), "Keyword expansion");
    log_file_saved!(path.display());
    Ok(expansion)
}

/// Entry point for the `keyword-expand` binary.
pub async fn run_keyword_expand(args: KeywordArgs, config: Config) -> Result<()> {
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.output_dir.clone());
    let runner = StageRunner::from_config(&config).context("Failed to build text generator")?;
    let volumes = NaverDataLabClient::new(config.search.clone())?;
    let expansion = run_keyword_expansion(&runner, &volumes, &args.keyword, &output_dir).await?;
    log_info!(
        "{}개 키워드 확장 완료 (검색량: {:?})",
        expansion.keywords.len(),
        expansion.volume_source
    );
    Ok(())
}
