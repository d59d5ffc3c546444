//! Writes rendered posts under `published/<platform>/`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use blog_pipeline_sdk::{log_file_saved, log_info};

use crate::config::LocalConfig;
use crate::content::types::FinishedPost;
use crate::error::{PipelineError, PipelineResult};
use crate::planner::types::InitialPipelineResult;
use crate::render::cli::RenderArgs;
use crate::render::{post_to_document, renderer_for, TemplateStore, PLATFORMS};
use crate::workflow_utils::files::{batch_file, content_file, INITIAL_PIPELINE_RESULT};
use crate::workflow_utils::{read_json, write_json_atomic, write_text_atomic};

/// Sidecar written next to each rendered post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishMetadata {
    pub title: String,
    pub tags: Vec<String>,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub platform: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct PublishedPost {
    pub platform: String,
    pub markup_path: PathBuf,
    pub metadata_path: PathBuf,
}

/// Daily output first, then the batch copy.
pub fn load_post(output_dir: &Path, day: u32) -> PipelineResult<FinishedPost> {
    let daily = content_file(output_dir, day);
    if daily.exists() {
        return read_json(&daily);
    }
    let batch = batch_file(output_dir, day);
    if batch.exists() {
        return read_json(&batch);
    }
    Err(PipelineError::MissingPrerequisite {
        path: daily,
        hint: "run daily-content or batch-posts for this day first".into(),
    })
}

pub fn publish_post(
    output_dir: &Path,
    templates: &TemplateStore,
    post: &FinishedPost,
    platform: &str,
) -> PipelineResult<PublishedPost> {
    let renderer = renderer_for(platform);
    let doc = post_to_document(post);
    let artifact = renderer.render(&doc, templates);

    let dir = output_dir.join("published").join(&artifact.platform);
    let markup_path = dir.join(format!("day{:02}.{}", post.day, artifact.extension));
    write_text_atomic(&markup_path, &artifact.markup)?;

    let metadata = PublishMetadata {
        title: doc.title,
        tags: doc.tags,
        meta_description: doc.meta_description,
        keywords: post.keywords_used.clone(),
        platform: artifact.platform.clone(),
        created_at: chrono::Local::now().to_rfc3339(),
    };
    let metadata_path = dir.join(format!("day{:02}.metadata.json", post.day));
    write_json_atomic(&metadata_path, &metadata)?;

    info!(day = post.day, platform = %artifact.platform, "post rendered");
    Ok(PublishedPost {
        platform: artifact.platform,
        markup_path,
        metadata_path,
    })
}

/// Recommended primary platform from the planning result, if there is one.
fn planned_platform(output_dir: &Path) -> Option<String> {
    let path = output_dir.join(INITIAL_PIPELINE_RESULT);
    read_json::<InitialPipelineResult>(&path)
        .ok()
        .map(|result| result.platform_recommendation.platform.id().to_string())
}

fn target_platforms(args: &RenderArgs, output_dir: &Path) -> Vec<String> {
    if args.all_platforms {
        return PLATFORMS.iter().map(|p| p.to_string()).collect();
    }
    let platform = args
        .platform
        .clone()
        .or_else(|| planned_platform(output_dir))
        .unwrap_or_else(|| "base".to_string());
    vec![platform]
}

/// Entry point for the `render-post` binary.
pub async fn run_render_post(args: RenderArgs, config: LocalConfig) -> Result<()> {
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());
    let post = load_post(&output_dir, args.day)
        .with_context(|| format!("Failed to load post for day {}", args.day))?;
    let templates = TemplateStore::load_dir(&config.policy.templates_dir);

    for platform in target_platforms(&args, &output_dir) {
        let published = publish_post(&output_dir, &templates, &post, &platform)
            .with_context(|| format!("Failed to publish day {} to {}", args.day, platform))?;
        log_info!("{} 렌더링 완료", published.platform);
        log_file_saved!(published.markup_path.display());
        log_file_saved!(published.metadata_path.display());
    }
    Ok(())
}
