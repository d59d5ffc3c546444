use clap::Parser;

use blog_pipeline::config::Config;
use blog_pipeline::content::cli::ToneArgs;
use blog_pipeline::content::run_tone_style;
use blog_pipeline::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = ToneArgs::parse();
    let config = Config::from_env()?;
    run_tone_style(args, config).await
}
