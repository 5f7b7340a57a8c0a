//! Route table for the Observer API.
//!
//! Query routes share the read lock, command routes take the write lock.
//! Every request is traced and CORS is open so a local dashboard can poll.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// The Observer router over `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Queries
        .route("/api/status", get(handlers::get_status))
        .route("/api/path", get(handlers::get_path))
        .route("/api/locations", get(handlers::list_locations))
        .route("/api/spikes", get(handlers::list_spikes))
        .route("/api/alerts", get(handlers::list_alerts))
        // Commands
        .route("/api/spikes/{id}/resolve", post(handlers::resolve_spike))
        .route("/api/advance", post(handlers::advance))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
