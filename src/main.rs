//! CLI entry point for coursesync.

use anyhow::{Context, Result};
use clap::Parser;
use coursesync_core::{Config, Crawler, HttpClient, session_keepalive};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    // Variables already set in the environment win over the file
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }

    let config = Config::from_env().context("invalid configuration")?;
    debug!(?config, "configuration loaded");

    let client = HttpClient::new(&config).context("could not create HTTP client")?;

    if args.session_keepalive {
        session_keepalive(&client, &config).await;
        return Ok(());
    }

    info!(root = %config.sync_directory.display(), "coursesync starting");
    let stats = Crawler::new(config, client).run().await?;
    info!(
        downloaded = stats.downloaded(),
        skipped = stats.skipped(),
        failed = stats.failed(),
        "coursesync finished"
    );

    Ok(())
}
