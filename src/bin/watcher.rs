use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use torn_money_watcher::config::{AppConfig, CONFIG_PATH};
use torn_money_watcher::poller;
use torn_money_watcher::server;
use torn_money_watcher::watcher::Watcher;

#[derive(Parser)]
#[command(name = "watcher", about = "Relay incoming Torn money transfers to Telegram and a live page")]
struct Args {
    /// Read settings from a TOML file instead of the environment
    #[arg(long, num_args = 0..=1, default_missing_value = CONFIG_PATH)]
    config: Option<PathBuf>,

    /// HTTP listen port (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let config = AppConfig::load(path)?;
            info!("Loaded config from {}", path.display());
            config
        }
        None => AppConfig::from_env()?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    let names: Vec<&str> = config.accounts.iter().map(|a| a.name.as_str()).collect();
    info!(
        "Watching {} account(s): {} (poll={}s, log capacity={})",
        names.len(),
        names.join(", "),
        config.settings.poll_interval_secs,
        config.settings.log_capacity,
    );

    let watcher = Arc::new(Watcher::from_config(&config)?);
    let _pollers = poller::start(
        Arc::clone(&watcher),
        config.poll_interval(),
        config.settings.skip_overlapping_polls,
    );

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        result = server::serve(watcher, config.server.port) => result?,
    }

    Ok(())
}
