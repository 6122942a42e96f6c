//! Web UI Routes
//!
//! Defines routes for the console.

use crate::handlers;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

/// Create the console router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Static assets
        .route("/static/*path", get(handlers::static_file))
        // Pages
        .route("/", get(handlers::dashboard))
        .route("/education", get(handlers::education))
        // Campaigns
        .route(
            "/campaigns",
            get(handlers::campaigns).post(handlers::create_campaign),
        )
        .route("/campaigns/:id/delete", post(handlers::delete_campaign))
        .route("/campaigns/:id/launch", post(handlers::open_launch))
        .route("/campaign-form/open", post(handlers::open_campaign_form))
        .route("/campaign-form/close", post(handlers::close_campaign_form))
        .route(
            "/launch/targets/:target_id",
            post(handlers::toggle_launch_target),
        )
        .route("/launch/confirm", post(handlers::confirm_launch))
        .route("/launch/cancel", post(handlers::cancel_launch))
        // Templates
        .route("/templates", get(handlers::templates))
        .route("/templates/:id/delete", post(handlers::delete_template))
        .route("/templates/:id/load", post(handlers::load_template))
        .route("/templates/:id/rename-start", post(handlers::start_rename))
        .route("/templates/:id/rename", post(handlers::rename_template))
        .route("/generator/generate", post(handlers::generate_template))
        .route("/generator/save", post(handlers::save_template))
        .route("/generator/discard", post(handlers::discard_draft))
        .route("/generator/rename-cancel", post(handlers::cancel_rename))
        // Targets
        .route(
            "/targets",
            get(handlers::targets).post(handlers::create_target),
        )
        .route("/targets/:id/delete", post(handlers::delete_target))
        .route("/target-form/open", post(handlers::open_target_form))
        .route("/target-form/close", post(handlers::close_target_form))
        .route("/history/:result_id/preview", post(handlers::open_preview))
        .route("/history/:result_id/caught", get(handlers::caught))
        .route("/preview/close", post(handlers::close_preview))
        .route("/preview/caught/close", post(handlers::close_caught))
        // Toasts
        .route("/toasts/:page/dismiss", post(handlers::dismiss_toast))
        // Health check
        .route("/health", get(handlers::health))
        // Add middleware
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
