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
        // Interaction control
        .route("/voice/start", post(handlers::start_interaction))
        .route("/voice/stop", post(handlers::stop_interaction))
        .route("/voice/reset", post(handlers::reset_session))
        // Session queries
        .route("/voice/status", get(handlers::get_status))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
