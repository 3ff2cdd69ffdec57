use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters for the current interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// When the current interaction was started
    pub started_at: Option<DateTime<Utc>>,

    /// Replies the backend marked as done
    pub turns_completed: usize,

    /// Sentences handed to the segmenter's queue
    pub sentences_queued: usize,

    /// Utterances that finished playing
    pub utterances_spoken: usize,

    /// Utterances the player could not speak (skipped)
    pub utterances_failed: usize,
}

impl SessionStats {
    pub fn started_now() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }
}
