//! PhishSim - Console entry point

use anyhow::Result;
use phishsim_client::{ApiClient, ApiClientConfig};
use phishsim_common::config::{Config, LoggingConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting PhishSim console...");
    info!("Using backend at {}", config.backend.url);

    let client = ApiClient::new(ApiClientConfig::from(config.backend.clone()))?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
    };

    phishsim_web::run(config.console, Arc::new(client), shutdown).await?;

    info!("PhishSim console shutdown complete");

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    // RUST_LOG wins over the configured level
    let directives = match logging.level.as_str() {
        "info" => "info,phishsim=debug".to_string(),
        level => level.to_string(),
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directives))
        .unwrap_or_else(|_| EnvFilter::new("info,phishsim=debug"));

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}
