// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use hireboard_client::cli::{handle_command, Cli};
use hireboard_client::context::SessionContext;
use hireboard_client::core::ConfigManager;
use std::collections::HashMap;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let vars: HashMap<String, String> = std::env::vars().collect();
            ConfigManager::load_with(path, &vars)?
        }
        None => ConfigManager::load()?,
    };
    config.ensure_directories().await?;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(&config.log.path)
        .with_context(|| format!("Failed to open log file: {}", config.log.path.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.log.level))
                .context("Invalid log level")?,
        )
        .init();

    info!("Starting hireboard client");
    info!("Environment: {}", config.environment);
    info!("API: {}", config.api.base_url);
    info!("Storage: {}", config.storage.path.display());

    let context = SessionContext::new(config)?;
    let result = handle_command(cli.command, &context).await;
    context.shutdown();

    result
}
