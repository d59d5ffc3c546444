use clap::Parser;

use blog_pipeline::config::Config;
use blog_pipeline::planner::cli::Args;
use blog_pipeline::planner::run_initial_pipeline;
use blog_pipeline::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = Config::from_env()?;
    run_initial_pipeline(args, config).await
}
