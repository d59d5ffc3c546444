use clap::Parser;

use blog_pipeline::config::Config;
use blog_pipeline::content::cli::DailyArgs;
use blog_pipeline::content::run_daily_content;
use blog_pipeline::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = DailyArgs::parse();
    let config = Config::from_env()?;
    run_daily_content(args, config).await
}
