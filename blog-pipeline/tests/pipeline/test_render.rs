//! Rendering generated posts with the shipped templates

use super::common::*;

use std::path::Path;

use blog_pipeline::config::{LocalConfig, PipelinePolicy};
use blog_pipeline::content::types::FinishedPost;
use blog_pipeline::render::cli::RenderArgs;
use blog_pipeline::render::{run_render_post, PublishMetadata, PLATFORMS};
use blog_pipeline::workflow_utils::files::{batch_file, content_file};
use blog_pipeline::workflow_utils::{read_json, write_json_atomic};

fn post(day: u32) -> FinishedPost {
    let mut post: FinishedPost = serde_json::from_str(&prose_reply()).unwrap();
    post.day = day;
    post.title = "겨울 가족 여행 준비물".into();
    post.seo_title = "겨울 가족 여행 준비물 체크".into();
    post.meta_description = "겨울 여행 전에 챙길 것".into();
    post.sections[0].h2_emoji = "🧥".into();
    post.recompute_full_text();
    post
}

fn local_config(output_dir: &Path) -> LocalConfig {
    LocalConfig {
        output_dir: output_dir.to_path_buf(),
        policy: PipelinePolicy {
            templates_dir: templates_dir(),
            ..PipelinePolicy::default()
        },
    }
}

fn args(day: u32, platform: Option<&str>, all_platforms: bool) -> RenderArgs {
    RenderArgs {
        day,
        platform: platform.map(str::to_string),
        all_platforms,
        output_dir: None,
    }
}

#[tokio::test]
async fn test_render_all_platforms() {
    let dir = tempfile::tempdir().unwrap();
    write_json_atomic(&content_file(dir.path(), 1), &post(1)).unwrap();

    run_render_post(args(1, None, true), local_config(dir.path()))
        .await
        .unwrap();

    for platform in PLATFORMS {
        let ext = if platform == "brunch" { "md" } else { "html" };
        let markup_path = dir.path().join(format!("published/{}/day01.{}", platform, ext));
        let markup = std::fs::read_to_string(&markup_path).unwrap();
        assert!(markup.contains("겨울 가족 여행 준비물 체크"), "{}", platform);
        assert!(!markup.contains("{{"), "unfilled placeholder for {}", platform);

        let metadata: PublishMetadata =
            read_json(&dir.path().join(format!("published/{}/day01.metadata.json", platform)))
                .unwrap();
        assert_eq!(metadata.platform, platform);
        assert_eq!(metadata.tags, vec!["겨울 여행"]);
    }

    let brunch = std::fs::read_to_string(dir.path().join("published/brunch/day01.md")).unwrap();
    assert!(brunch.contains("## 🧥 옷차림"));
    assert!(brunch.contains("### 아이 옷"));
    assert!(!brunch.contains("<p>"));
}

#[tokio::test]
async fn test_render_defaults_to_planned_platform() {
    let dir = tempfile::tempdir().unwrap();
    seed_generation_inputs(dir.path());
    write_json_atomic(&batch_file(dir.path(), 6), &post(6)).unwrap();

    run_render_post(args(6, None, false), local_config(dir.path()))
        .await
        .unwrap();

    assert!(dir.path().join("published/tistory/day06.html").exists());
    assert!(!dir.path().join("published/naver").exists());
}

#[tokio::test]
async fn test_unknown_platform_renders_plain_document() {
    let dir = tempfile::tempdir().unwrap();
    write_json_atomic(&content_file(dir.path(), 2), &post(2)).unwrap();

    run_render_post(args(2, Some("medium"), false), local_config(dir.path()))
        .await
        .unwrap();

    let markup = std::fs::read_to_string(dir.path().join("published/base/day02.html")).unwrap();
    assert!(markup.starts_with("<!DOCTYPE html>"));
    assert!(markup.contains("<h2>🧥 옷차림</h2>"));
}

#[tokio::test]
async fn test_render_missing_day_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_render_post(args(9, Some("naver"), false), local_config(dir.path()))
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("day 9"));
    assert!(!dir.path().join("published").exists());
}
