use super::state::AppState;
use crate::session::SessionSnapshot;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The command that was queued
    pub accepted: &'static str,
    /// State at the time the command was queued (it applies asynchronously)
    pub session: SessionSnapshot,
}

fn accepted(command: &'static str, state: &AppState) -> impl IntoResponse {
    (
        StatusCode::ACCEPTED,
        Json(CommandResponse {
            accepted: command,
            session: state.session.snapshot(),
        }),
    )
}

/// POST /voice/start
/// Begin a voice interaction
pub async fn start_interaction(State(state): State<AppState>) -> impl IntoResponse {
    info!("HTTP: start interaction");
    state.session.start_interaction();
    accepted("start", &state)
}

/// POST /voice/stop
/// The user finished speaking
pub async fn stop_interaction(State(state): State<AppState>) -> impl IntoResponse {
    info!("HTTP: stop interaction");
    state.session.stop_interaction();
    accepted("stop", &state)
}

/// POST /voice/reset
/// Release everything and return to idle
pub async fn reset_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("HTTP: reset session");
    state.session.reset();
    accepted("reset", &state)
}

/// GET /voice/status
/// Current status, transcript, spoken reply and error
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.session.snapshot()))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
