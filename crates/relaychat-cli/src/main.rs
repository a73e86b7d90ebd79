//! Relaychat CLI entry point

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use relaychat_cli::{cli::Cli, config::AppConfig, console, error::Result};
use relaychat_core::{BrokerServer, ChannelObserver};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let mut config = load_configuration(&cli)?;
    config.apply_cli_overrides(&cli);

    let (observer, events) = ChannelObserver::channel();
    let mut server = BrokerServer::new(config.broker, Arc::new(observer));
    server.start().await?;
    info!(
        addr = %server.local_addr().map(|a| a.to_string()).unwrap_or_default(),
        "broker listening, press Ctrl-C to stop"
    );

    let renderer = tokio::spawn(console::render_events(events));

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    server.stop().await;

    // Dropping the server releases the observer, which closes the event
    // channel and lets the renderer finish.
    drop(server);
    let _ = renderer.await;

    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();
}

/// Load configuration from file or use defaults
fn load_configuration(cli: &Cli) -> Result<AppConfig> {
    if let Some(config_path) = &cli.config {
        info!("loading configuration from {config_path}");
        AppConfig::load_from_file(config_path)
    } else {
        Ok(AppConfig::default())
    }
}
