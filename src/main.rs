mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use sketchkit::{init_logging, Config, Workspace};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();

    init_logging()?;
    tracing::debug!("sketchkit {} built {}", sketchkit::VERSION, sketchkit::BUILD_DATE);

    let config =
        Config::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    let workspace = Workspace::from_config(config)?;

    cli::run(args.command, &workspace).await
}
