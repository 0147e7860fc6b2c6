use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use feedmux::app::{App, AppEvent};
use feedmux::config::Config;
use feedmux::feed::{Aggregator, HttpSourceClient};
use feedmux::ui;

#[derive(Parser, Debug)]
#[command(
    name = "feedmux",
    about = "Terminal feed aggregator: many RSS/Atom feeds in one live list"
)]
struct Args {
    /// Config file to use instead of ~/.config/feedmux/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore the config file and run with built-in defaults
    #[arg(short = 'i', long, conflicts_with = "config")]
    ignore_config: bool,
}

fn load_config(args: &Args) -> Result<Config> {
    if args.ignore_config {
        tracing::info!("Ignoring config file, using defaults");
        return Ok(Config::default());
    }

    let path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_path().context("Cannot locate the config directory")?,
    };

    Config::load_or_create(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; redirect it (2>feedmux.log) to keep them off the TUI
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let client = HttpSourceClient::new().context("Failed to create HTTP client")?;
    let aggregator = Aggregator::new(Arc::new(client)).with_fetch_timeout(config.fetch_timeout());

    let mut app = App::new(config, aggregator);
    tracing::info!(sources = app.sources.len(), "Starting feedmux");

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Run the TUI
    ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}
