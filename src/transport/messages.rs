use serde::{Deserialize, Serialize};

/// Message sent from the client to the voice backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Sent once, right after the connection opens
    Start,
    /// The user's final utterance for this turn
    UserTranscript(String),
}

/// Message received from the voice backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Streamed reply fragment, concatenated in arrival order
    AiChunk(String),
    /// No more chunks follow for this turn
    AiDone,
    /// Server-side failure
    Error(String),
}

impl ClientMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl ServerMessage {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
