use serde::{Deserialize, Serialize};

/// Transcript message received from STT service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub session_id: String,
    pub text: String,
    pub partial: bool,
    pub timestamp: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Synthesis request sent to the TTS service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakRequest {
    pub session_id: String,
    pub utterance_id: u64,
    pub text: String,
}

/// Reply from the TTS service once the utterance has played (or failed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakReply {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}
