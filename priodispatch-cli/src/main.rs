//! Runs a priodispatch worker pool from a JSON config file.

use std::path::PathBuf;

use clap::Parser;
use priodispatch::{Config, Runner};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    let runner = Runner::build(config).await?;

    tracing::info!(config = %cli.config.display(), "[PRIORITY_PUBSUB] starting priodispatch");
    runner.run().await;

    Ok(())
}
