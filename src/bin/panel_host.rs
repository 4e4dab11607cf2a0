//! Desktop host for the GPIO panel.
//!
//! Connects to the ESP32 over WebSocket and serves the JSON API that a
//! front-end uses to configure pins.
//!
//! # Run
//!
//! ```bash
//! cargo run --features host --bin panel_host -- --config panel.toml
//! cargo run --features host --bin panel_host -- --endpoint ws://192.168.4.1/ws --port 3000
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gpio_panel::config::Config;
use gpio_panel::hal::WsTransport;
use gpio_panel::services::{run_server_with_state, SharedPanel, SyncRunner, WebServerConfig};
use gpio_panel::Panel;

/// GPIO panel host
#[derive(Parser, Debug)]
#[command(name = "panel_host", about = "ESP32 GPIO configuration panel host.")]
struct Cli {
    /// Path to a TOML config file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device WebSocket URL (overrides the config file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// HTTP API port (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        config.device = config.device.with_endpoint(endpoint);
    }
    if let Some(port) = cli.port {
        config.web = config.web.with_port(port);
    }

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting GPIO panel for {}", config.device.name);
    tracing::info!("Device endpoint: {}", config.device.endpoint);

    let panel = Panel::from_config(WsTransport::new(), &config);
    let state = Arc::new(SharedPanel::new(panel));

    let runner = SyncRunner::new(Arc::clone(&state), &config.sync);
    let sync_task = tokio::spawn(runner.run_until(async {
        let _ = tokio::signal::ctrl_c().await;
    }));

    if config.web.enabled {
        let web_config = WebServerConfig::from_config(&config.web);
        tokio::select! {
            result = run_server_with_state(Arc::clone(&state), web_config) => {
                result.context("web server failed")?;
            }
            _ = tokio::signal::ctrl_c() => {}
        }
    }

    sync_task.await.context("sync task panicked")?;
    tracing::info!("Shut down");
    Ok(())
}
