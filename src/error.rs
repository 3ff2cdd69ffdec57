use thiserror::Error;

/// Failures reported by a transcript source.
///
/// Every variant is fatal to the current session; `user_message` gives the
/// sentence shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("no speech detected")]
    NoSpeech,

    #[error("audio capture unavailable")]
    AudioCapture,

    #[error("permission denied")]
    NotAllowed,

    #[error("speech recognition service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to start capture: {0}")]
    StartFailed(String),

    #[error("capture error ({code}): {message}")]
    Other { code: String, message: String },
}

impl CaptureError {
    /// Map a recognizer error code (`no-speech`, `audio-capture`, ...) to a variant
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "no-speech" => CaptureError::NoSpeech,
            "audio-capture" => CaptureError::AudioCapture,
            "not-allowed" | "service-not-allowed" => CaptureError::NotAllowed,
            "service-unavailable" => CaptureError::ServiceUnavailable(message),
            "network" => CaptureError::Network(message),
            "start-failed" => CaptureError::StartFailed(message),
            other => CaptureError::Other {
                code: other.to_string(),
                message,
            },
        }
    }

    pub fn code(&self) -> &str {
        match self {
            CaptureError::NoSpeech => "no-speech",
            CaptureError::AudioCapture => "audio-capture",
            CaptureError::NotAllowed => "not-allowed",
            CaptureError::ServiceUnavailable(_) => "service-unavailable",
            CaptureError::Network(_) => "network",
            CaptureError::StartFailed(_) => "start-failed",
            CaptureError::Other { code, .. } => code,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            CaptureError::NoSpeech => "No speech was detected. Please try again.".to_string(),
            CaptureError::AudioCapture => {
                "No microphone was found. Check that one is connected.".to_string()
            }
            CaptureError::NotAllowed => {
                "Microphone access was denied. Allow access and try again.".to_string()
            }
            CaptureError::ServiceUnavailable(_) => {
                "The speech recognition service is unavailable.".to_string()
            }
            CaptureError::Network(_) => {
                "A network error interrupted speech recognition.".to_string()
            }
            CaptureError::StartFailed(reason) => {
                format!("Could not start speech recognition: {}", reason)
            }
            CaptureError::Other { code, .. } => format!("Speech recognition error: {}", code),
        }
    }
}
