//! HTTP API for the hosting view
//!
//! This module exposes the voice session's public entry points:
//! - POST /voice/start - Begin an interaction
//! - POST /voice/stop - User finished speaking
//! - POST /voice/reset - Tear the session down
//! - GET /voice/status - Query session state
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
