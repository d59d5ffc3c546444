//! Planning from idea to persisted plan

use super::common::*;

use blog_pipeline::generation::GenerationMode;
use blog_pipeline::planner::run_planning;
use blog_pipeline::planner::types::{InitialPipelineResult, Platform, SerpData, PLAN_CATEGORIES};
use blog_pipeline::workflow_utils::files::{INITIAL_PIPELINE_RESULT, SERP_DATA};
use blog_pipeline::workflow_utils::read_json;

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn test_plan_for_family_winter_trip() {
    let dir = tempfile::tempdir().unwrap();
    let generator = StubGenerator::new(planning_replies());
    let services = services(generator.clone(), 30);

    let result = run_planning(&planner_config(dir.path()), &services)
        .await
        .unwrap();

    assert_eq!(result.user_idea, IDEA);
    assert_eq!(result.expanded_topics.original_idea, IDEA);
    assert_eq!(result.expanded_topics.topics.len(), 3);

    // Totals are recomputed, not taken from the reply.
    let selected = &result.scored_topics.selected_topic;
    assert_eq!(selected.title, "아이와 함께하는 겨울 국내 여행");
    assert_eq!(selected.total_score, 22);

    assert_eq!(result.platform_recommendation.platform, Platform::Naver);
    assert_eq!(result.serp_data.total_results, 30);
    assert_eq!(result.serp_data.platform, "네이버 블로그");

    let counts = result.content_plan.category_counts();
    assert_eq!(result.content_plan.days.len(), 30);
    for category in PLAN_CATEGORIES {
        assert_eq!(counts[category], 5, "category {}", category);
    }

    let saved: InitialPipelineResult = read_json(&dir.path().join(INITIAL_PIPELINE_RESULT)).unwrap();
    assert_eq!(saved, result);
    let serp: SerpData = read_json(&dir.path().join(SERP_DATA)).unwrap();
    assert_eq!(serp, result.serp_data);
}

#[tokio::test]
async fn test_plan_prompt_carries_every_serp_title() {
    let dir = tempfile::tempdir().unwrap();
    let generator = StubGenerator::new(planning_replies());
    run_planning(&planner_config(dir.path()), &services(generator.clone(), 30))
        .await
        .unwrap();

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 4, "unreachable pages must not be summarized");
    let (plan_prompt, _) = &prompts[3];
    assert!(plan_prompt.contains("겨울 가족 여행 후기 1"));
    assert!(plan_prompt.contains("겨울 가족 여행 후기 30"));
    let modes: Vec<GenerationMode> = prompts.iter().map(|(_, mode)| *mode).collect();
    assert_eq!(modes[..3], [GenerationMode::Fast; 3]);
    assert_eq!(modes[3], GenerationMode::Creative);
}

// ============================================================================
// Degraded inputs
// ============================================================================

#[tokio::test]
async fn test_unreachable_pages_leave_results_bare() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_planning(
        &planner_config(dir.path()),
        &services(StubGenerator::new(planning_replies()), 5),
    )
    .await
    .unwrap();

    assert_eq!(result.serp_data.serp_results.len(), 5);
    for (idx, serp) in result.serp_data.serp_results.iter().enumerate() {
        assert_eq!(serp.rank as usize, idx + 1);
        assert!(serp.content.is_empty());
        assert!(serp.summary.is_empty());
        assert!(serp.h2_list.is_empty());
    }
}

#[tokio::test]
async fn test_empty_search_still_plans() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_planning(
        &planner_config(dir.path()),
        &services(StubGenerator::new(planning_replies()), 0),
    )
    .await
    .unwrap();

    assert_eq!(result.serp_data.total_results, 0);
    assert!(result.serp_data.serp_results.is_empty());
    assert_eq!(result.content_plan.days.len(), 30);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_invalid_plan_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut replies = planning_replies();
    let mut plan = plan_json("t");
    plan["30_days_plan"].as_array_mut().unwrap().pop();
    replies[3] = plan.to_string();

    let err = run_planning(
        &planner_config(dir.path()),
        &services(StubGenerator::new(replies), 3),
    )
    .await
    .unwrap_err();

    assert!(format!("{:#}", err).contains("expected 30 plan items"));
    assert!(!dir.path().join(INITIAL_PIPELINE_RESULT).exists());
    assert!(!dir.path().join(SERP_DATA).exists());
}

#[tokio::test]
async fn test_unknown_platform_stops_planning() {
    let dir = tempfile::tempdir().unwrap();
    let mut replies = planning_replies();
    replies[2] = r#"{"primary_platform": "싸이월드"}"#.to_string();

    let err = run_planning(
        &planner_config(dir.path()),
        &services(StubGenerator::new(replies), 3),
    )
    .await
    .unwrap_err();
    assert!(format!("{:#}", err).contains("싸이월드"));
}

#[tokio::test]
async fn test_empty_idea_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = planner_config(dir.path());
    config.idea = Some("   ".into());
    let generator = StubGenerator::new(planning_replies());

    assert!(run_planning(&config, &services(generator.clone(), 3)).await.is_err());
    assert!(generator.prompts().is_empty());
}
