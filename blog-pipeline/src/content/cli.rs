//! CLI arguments for tone derivation and post generation.

use clap::Parser;
use std::path::PathBuf;

/// Derive a tone & style guide from collected search results
///
/// Requires `serp_data.json` from `initial-pipeline`. Writes
/// `tone_analysis.json` and `tone_style_guide.json`.
#[derive(Parser, Debug, Clone)]
#[command(name = "tone-style")]
#[command(about = "Analyze competing posts and write a tone & style guide")]
#[command(version)]
pub struct ToneArgs {
    /// Override the analyzed personality (e.g. "유쾌한")
    #[arg(long, value_name = "TEXT")]
    pub tone: Option<String>,

    /// Override the analyzed formality (e.g. "존댓말")
    #[arg(long, value_name = "TEXT")]
    pub formality: Option<String>,

    /// Override the recommended length (e.g. "2000~2500자")
    #[arg(long, value_name = "TEXT")]
    pub length: Option<String>,

    /// Output directory (defaults to BLOG_OUTPUT_DIR or ./outputs)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Generate one day's post from the 30-day plan
#[derive(Parser, Debug, Clone)]
#[command(name = "daily-content")]
#[command(about = "Write one day's post (outline, then prose)")]
#[command(version)]
pub struct DailyArgs {
    /// Day to generate (1-30); prompted for when neither this nor --auto is given
    #[arg(long, conflicts_with = "auto")]
    pub day: Option<u32>,

    /// Continue from the saved resume state without prompting
    #[arg(long)]
    pub auto: bool,

    /// Skip trend keyword injection
    #[arg(long)]
    pub no_trends: bool,

    /// Overwrite the day's post if it already exists
    #[arg(long)]
    pub regenerate: bool,

    /// Also render the post for this platform
    #[arg(long, value_name = "NAME")]
    pub platform: Option<String>,

    /// Output directory (defaults to BLOG_OUTPUT_DIR or ./outputs)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Generate a range of days in one run
///
/// Stops early after too many consecutive failures and always writes
/// `batch_posts/generation_summary.json`.
#[derive(Parser, Debug, Clone)]
#[command(name = "batch-posts")]
#[command(about = "Write posts for a range of days")]
#[command(version)]
pub struct BatchArgs {
    /// First day; prompted for when omitted
    #[arg(long)]
    pub start: Option<u32>,

    /// Last day; prompted for when omitted
    #[arg(long)]
    pub end: Option<u32>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Stop after this many failed days in a row (defaults to the policy value)
    #[arg(long, value_name = "N")]
    pub max_consecutive_failures: Option<usize>,

    /// Output directory (defaults to BLOG_OUTPUT_DIR or ./outputs)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}
