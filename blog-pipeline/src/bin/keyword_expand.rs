use clap::Parser;

use blog_pipeline::config::Config;
use blog_pipeline::planner::cli::KeywordArgs;
use blog_pipeline::planner::run_keyword_expand;
use blog_pipeline::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = KeywordArgs::parse();
    let config = Config::from_env()?;
    run_keyword_expand(args, config).await
}
