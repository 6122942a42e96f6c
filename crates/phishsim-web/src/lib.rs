//! PhishSim Web Console
//!
//! Server-rendered operator console for the phishing-simulation backend.

mod handlers;
pub mod preview;
mod routes;
pub mod selection;
mod templates;
pub mod toast;
pub mod views;

#[cfg(test)]
mod testing;

use axum::Router;
use phishsim_client::Backend;
use phishsim_common::config::ConsoleConfig;
use rust_embed::RustEmbed;
use std::future::Future;
use std::sync::Arc;
use views::Pages;

/// Static files for the console
#[derive(RustEmbed)]
#[folder = "static/"]
pub struct StaticAssets;

/// Application state for the console
#[derive(Clone)]
pub struct AppState {
    pub config: ConsoleConfig,
    pub templates: Arc<templates::Templates>,
    pub pages: Arc<Pages>,
}

impl AppState {
    /// Create a new app state talking to `backend`
    pub fn new(config: ConsoleConfig, backend: Arc<dyn Backend>) -> phishsim_common::Result<Self> {
        let pages = Pages::new(backend, config.toast_ttl());
        Ok(Self {
            config,
            templates: Arc::new(templates::Templates::new()?),
            pages: Arc::new(pages),
        })
    }
}

/// Create the console router
pub fn create_router(state: AppState) -> Router {
    routes::create_router(state)
}

/// Run the console until `shutdown` resolves
pub async fn run(
    config: ConsoleConfig,
    backend: Arc<dyn Backend>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let state = AppState::new(config.clone(), backend)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("Console listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
