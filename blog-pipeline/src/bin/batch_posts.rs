use clap::Parser;

use blog_pipeline::config::Config;
use blog_pipeline::content::cli::BatchArgs;
use blog_pipeline::content::run_batch_posts;
use blog_pipeline::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = BatchArgs::parse();
    let config = Config::from_env()?;
    run_batch_posts(args, config).await
}
