//! Voice session management
//!
//! This module provides the `Orchestrator` state machine that ties together:
//! - The duplex transport to the voice backend
//! - Transcript capture from the user's speech
//! - Sentence segmentation and one-at-a-time playback of the reply
//! - Idempotent teardown of all of the above

mod config;
mod event;
mod handle;
mod orchestrator;
mod state;
mod stats;

pub use config::{RestartPolicy, SessionConfig};
pub use event::{Command, Envelope, EventSink, SessionEvent};
pub use handle::VoiceSession;
pub use orchestrator::Orchestrator;
pub use state::{Session, SessionSnapshot, SessionStatus};
pub use stats::SessionStats;
