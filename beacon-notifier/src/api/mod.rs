//! API Module
//!
//! HTTP API through which the orchestrator reports build lifecycle events.

pub mod builds;
pub mod error;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::service::NotificationDispatcher;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<NotificationDispatcher>,
}

/// Create the main API router with all endpoints
pub fn create_router(dispatcher: Arc<NotificationDispatcher>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Build lifecycle endpoints
        .route("/api/builds/started", post(builds::build_started))
        .route("/api/builds/finished", post(builds::build_finished))
        // Add state and middleware
        .with_state(AppState { dispatcher })
        .layer(TraceLayer::new_for_http())
}

/// GET /health
async fn health() -> &'static str {
    "OK"
}
