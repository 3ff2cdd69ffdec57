use crate::session::RestartPolicy;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `LOQA_VOICE__TRANSPORT__URL`
const ENV_PREFIX: &str = "LOQA_VOICE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub transport: TransportConfig,
    pub capture: CaptureConfig,
    pub playback: PlaybackConfig,
    pub session: SessionSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "loqa-voice".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3010,
        }
    }
}

/// Remote voice endpoint (terminates the duplex connection)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub url: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8000/ws/voice".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub nats_url: String,

    /// Subject the STT service publishes partial and final transcripts on
    pub subject: String,

    /// STT session to follow; a fresh one is generated when unset
    pub session_id: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            nats_url: "nats://localhost:4222".to_string(),
            subject: "stt.text.>".to_string(),
            session_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackBackend {
    /// Print sentences to the terminal, paced like speech
    Console,
    /// Request synthesis from a TTS service over NATS
    Nats,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub backend: PlaybackBackend,
    pub words_per_minute: u32,
    pub nats_url: String,
    pub subject: String,
    pub request_timeout_secs: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            backend: PlaybackBackend::Console,
            words_per_minute: 170,
            nats_url: "nats://localhost:4222".to_string(),
            subject: "tts.speak".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub restart_policy: RestartPolicy,
}

impl Config {
    /// Load configuration from `path` (extension optional) layered with
    /// `LOQA_VOICE__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}
