use crate::session::VoiceSession;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single live voice session
    pub session: VoiceSession,
}

impl AppState {
    pub fn new(session: VoiceSession) -> Self {
        Self { session }
    }
}
