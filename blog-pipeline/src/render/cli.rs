//! CLI arguments for rendering.

use clap::Parser;
use std::path::PathBuf;

/// Render a generated day for one or more platforms
///
/// Reads `content/dayNN_content.json` (or the batch copy) and writes
/// `published/<platform>/dayNN.<ext>` with a metadata sidecar.
#[derive(Parser, Debug, Clone)]
#[command(name = "render-post")]
#[command(about = "Render a generated post as platform HTML or Markdown")]
#[command(version)]
pub struct RenderArgs {
    /// Day to render (1-30)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=30))]
    pub day: u32,

    /// naver, tistory, wordpress or brunch; others render as plain HTML.
    /// Defaults to the plan's recommended platform.
    #[arg(long, value_name = "NAME")]
    pub platform: Option<String>,

    /// Render for every supported platform
    #[arg(long, conflicts_with = "platform")]
    pub all_platforms: bool,

    /// Output directory (defaults to BLOG_OUTPUT_DIR or ./outputs)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}
