use clap::Parser;

use blog_pipeline::config::LocalConfig;
use blog_pipeline::render::cli::RenderArgs;
use blog_pipeline::render::run_render_post;
use blog_pipeline::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = RenderArgs::parse();
    let config = LocalConfig::from_env()?;
    run_render_post(args, config).await
}
