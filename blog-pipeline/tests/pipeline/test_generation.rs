//! Daily and batch generation against a seeded plan

use super::common::*;

use blog_pipeline::content::cli::{BatchArgs, DailyArgs};
use blog_pipeline::content::{run_batch, run_daily, DailyOutcome, DailyState, DayStatus};
use blog_pipeline::interactive::ScriptedPrompter;
use blog_pipeline::render::TemplateStore;
use blog_pipeline::workflow_utils::files::{batch_file, content_file, BATCH_SUMMARY};
use blog_pipeline::workflow_utils::StageRunner;

fn daily_args(day: Option<u32>) -> DailyArgs {
    DailyArgs {
        day,
        auto: day.is_none(),
        no_trends: true,
        regenerate: false,
        platform: None,
        output_dir: None,
    }
}

fn batch_args(start: u32, end: u32) -> BatchArgs {
    BatchArgs {
        start: Some(start),
        end: Some(end),
        yes: true,
        max_consecutive_failures: None,
        output_dir: None,
    }
}

// ============================================================================
// Daily
// ============================================================================

#[tokio::test]
async fn test_full_text_length_ignores_word_count() {
    let dir = tempfile::tempdir().unwrap();
    seed_generation_inputs(dir.path());
    let runner = StageRunner::new(StubGenerator::new([structure_reply(), prose_reply()]));

    let outcome = run_daily(
        runner,
        &ScriptedPrompter::default(),
        dir.path(),
        &TemplateStore::empty(),
        &daily_args(Some(1)),
    )
    .await
    .unwrap();

    let post = outcome.post().expect("day 1 generated");
    assert_eq!(post.full_text, "시작첫 문단 둘째끝");
    assert_eq!(post.full_text_length, 10);
    assert_eq!(post.word_count, 9999);
    assert_eq!(post.h1, "겨울 가족 여행 준비물 총정리");
    assert_eq!(post.title, "겨울 국내 여행 글감 1");
    assert!(content_file(dir.path(), 1).exists());
    assert_eq!(DailyState::load(dir.path()).unwrap().next_day, 2);
}

#[tokio::test]
async fn test_existing_day_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    seed_generation_inputs(dir.path());
    let first = StageRunner::new(StubGenerator::new([structure_reply(), prose_reply()]));
    run_daily(
        first,
        &ScriptedPrompter::default(),
        dir.path(),
        &TemplateStore::empty(),
        &daily_args(Some(4)),
    )
    .await
    .unwrap();

    let generator = StubGenerator::failing();
    let outcome = run_daily(
        StageRunner::new(generator.clone()),
        &ScriptedPrompter::default(),
        dir.path(),
        &TemplateStore::empty(),
        &daily_args(Some(4)),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, DailyOutcome::Skipped { day: 4, .. }));
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn test_daily_prompts_for_day_with_resume_default() {
    let dir = tempfile::tempdir().unwrap();
    seed_generation_inputs(dir.path());
    let prompter = ScriptedPrompter::new([""]);
    let mut args = daily_args(None);
    args.auto = false;

    let outcome = run_daily(
        StageRunner::new(StubGenerator::new(["없음", "없음"])),
        &prompter,
        dir.path(),
        &TemplateStore::empty(),
        &args,
    )
    .await
    .unwrap();

    assert_eq!(prompter.asked().len(), 1);
    assert_eq!(outcome.post().map(|p| p.day), Some(1));
}

#[tokio::test]
async fn test_daily_publishes_when_platform_given() {
    let dir = tempfile::tempdir().unwrap();
    seed_generation_inputs(dir.path());
    let mut args = daily_args(Some(2));
    args.platform = Some("naver".into());

    run_daily(
        StageRunner::new(StubGenerator::new([structure_reply(), prose_reply()])),
        &ScriptedPrompter::default(),
        dir.path(),
        &TemplateStore::load_dir(&templates_dir()),
        &args,
    )
    .await
    .unwrap();

    let markup = std::fs::read_to_string(dir.path().join("published/naver/day02.html")).unwrap();
    assert!(markup.contains("겨울 가족 여행 준비물"));
    assert!(!markup.contains("{{content}}"));
    assert!(dir.path().join("published/naver/day02.metadata.json").exists());
}

#[tokio::test]
async fn test_daily_requires_plan() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_daily(
        StageRunner::new(StubGenerator::failing()),
        &ScriptedPrompter::default(),
        dir.path(),
        &TemplateStore::empty(),
        &daily_args(Some(1)),
    )
    .await
    .unwrap_err();
    assert!(format!("{:#}", err).contains("initial-pipeline"));
}

// ============================================================================
// Batch
// ============================================================================

#[tokio::test]
async fn test_batch_aborts_after_consecutive_failures() {
    let dir = tempfile::tempdir().unwrap();
    seed_generation_inputs(dir.path());

    let summary = run_batch(
        StageRunner::new(StubGenerator::failing()),
        &ScriptedPrompter::default(),
        dir.path(),
        &batch_args(1, 10),
        3,
    )
    .await
    .unwrap()
    .expect("confirmation skipped with --yes");

    assert!(summary.aborted);
    assert_eq!(summary.total_count, 3);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.successful, 0);
    assert!(summary
        .results
        .iter()
        .all(|r| r.status == DayStatus::Failed && r.error.is_some()));
    assert!(dir.path().join("batch_posts").join(BATCH_SUMMARY).exists());
    assert!(!batch_file(dir.path(), 1).exists());
    assert_eq!(DailyState::load(dir.path()).unwrap().next_day, 1);
}

#[tokio::test]
async fn test_resume_continues_after_last_generated_day() {
    let dir = tempfile::tempdir().unwrap();
    seed_generation_inputs(dir.path());

    let summary = run_batch(
        StageRunner::new(StubGenerator::new(["없음"; 4])),
        &ScriptedPrompter::default(),
        dir.path(),
        &batch_args(1, 2),
        3,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(summary.successful, 2);
    assert!(batch_file(dir.path(), 2).exists());
    assert!(!content_file(dir.path(), 2).exists());

    let state = DailyState::load(dir.path()).unwrap();
    assert_eq!(state.last_generated_day, Some(2));
    assert_eq!(state.next_day, 3);

    let outcome = run_daily(
        StageRunner::new(StubGenerator::new(["없음"; 2])),
        &ScriptedPrompter::default(),
        dir.path(),
        &TemplateStore::empty(),
        &daily_args(None),
    )
    .await
    .unwrap();
    assert_eq!(outcome.post().map(|p| p.day), Some(3));
    assert_eq!(DailyState::load(dir.path()).unwrap().next_day, 4);
}

#[tokio::test]
async fn test_declined_batch_generates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    seed_generation_inputs(dir.path());
    // Start and end take their defaults, then the run is declined.
    let prompter = ScriptedPrompter::new(["", "", "n"]);
    let args = BatchArgs {
        start: None,
        end: None,
        yes: false,
        max_consecutive_failures: None,
        output_dir: None,
    };
    let generator = StubGenerator::failing();

    let summary = run_batch(
        StageRunner::new(generator.clone()),
        &prompter,
        dir.path(),
        &args,
        3,
    )
    .await
    .unwrap();

    assert!(summary.is_none());
    assert_eq!(prompter.asked().len(), 3);
    assert!(prompter.asked()[1].contains("[30]"));
    assert!(generator.prompts().is_empty());
    assert!(!dir.path().join("batch_posts").join(BATCH_SUMMARY).exists());
}
