use super::stats::SessionStats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a voice interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Connecting,
    Listening,
    Processing,
    Speaking,
    Error,
}

impl SessionStatus {
    /// A new interaction may only begin from here
    pub fn accepts_start(self) -> bool {
        matches!(self, SessionStatus::Idle | SessionStatus::Error)
    }

    /// Holding transport/capture resources
    pub fn is_active(self) -> bool {
        !self.accepts_start()
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Listening => "listening",
            SessionStatus::Processing => "processing",
            SessionStatus::Speaking => "speaking",
            SessionStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// User-visible fields of the live session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub status: SessionStatus,

    /// Latest known user utterance, interim or final
    pub transcript: Option<String>,

    /// Reply text already spoken aloud
    pub ai_response_text: Option<String>,

    pub error: Option<String>,
}

impl Session {
    /// The idle template a session returns to on teardown
    pub fn idle() -> Self {
        Self {
            status: SessionStatus::Idle,
            transcript: None,
            ai_response_text: None,
            error: None,
        }
    }

    /// Append a spoken sentence to the cumulative response
    pub fn append_response(&mut self, sentence: &str) {
        match &mut self.ai_response_text {
            Some(text) if !text.is_empty() => {
                text.push(' ');
                text.push_str(sentence);
            }
            _ => self.ai_response_text = Some(sentence.to_string()),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::idle()
    }
}

/// Point-in-time view published to hosts after every dispatched envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub transcript: Option<String>,
    pub ai_response_text: Option<String>,
    pub error: Option<String>,
    pub stats: SessionStats,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            transcript: None,
            ai_response_text: None,
            error: None,
            stats: SessionStats::default(),
        }
    }
}
