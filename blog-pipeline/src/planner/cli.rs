//! CLI arguments for the initial planning pipeline.

use clap::Parser;
use std::path::PathBuf;

/// Idea to 30-day content plan
///
/// Runs the planning steps in order and writes
/// `initial_pipeline_result.json` and `serp_data.json`:
///
/// - Step 0: Refine the idea through a short Q&A (only with --refine)
/// - Step 1: Expand the idea into topic candidates
/// - Step 2: Score candidates and select the best topic
/// - Step 3: Recommend a publishing platform
/// - Step 4: Collect competing search results
/// - Step 5: Build the 30-day rotation
#[derive(Parser, Debug, Clone)]
#[command(name = "initial-pipeline")]
#[command(about = "Turn an idea into scored topics, a platform and a 30-day plan")]
#[command(version)]
pub struct Args {
    /// Blog idea; prompted for when omitted
    #[arg(long, value_name = "TEXT")]
    pub idea: Option<String>,

    /// Refine the idea interactively before expanding it
    #[arg(long)]
    pub refine: bool,

    /// Also crawl recent and popular posts from each result's blog home
    #[arg(long)]
    pub crawl: bool,

    /// Output directory (defaults to BLOG_OUTPUT_DIR or ./outputs)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the standalone keyword expansion command.
#[derive(Parser, Debug, Clone)]
#[command(name = "keyword-expand")]
#[command(about = "Expand a seed keyword with volumes, difficulty and clusters")]
#[command(version)]
pub struct KeywordArgs {
    /// Seed keyword
    #[arg(long, value_name = "TEXT")]
    pub keyword: String,

    /// Output directory (defaults to BLOG_OUTPUT_DIR or ./outputs)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}
