use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session commands
        .route("/session/initialize", post(handlers::initialize))
        .route("/session/toggle", post(handlers::toggle_publish))
        .route("/session/switch-source", post(handlers::switch_source))
        // Session queries
        .route("/session/status", get(handlers::get_status))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
