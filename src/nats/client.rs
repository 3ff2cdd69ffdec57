use super::messages::{SpeakReply, SpeakRequest};
use anyhow::{bail, Context, Result};
use async_nats::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Thin wrapper over the NATS connection shared by capture and playback
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }

    /// Subscribe to transcript messages (partial and final)
    pub async fn subscribe_transcripts(&self, subject: &str) -> Result<async_nats::Subscriber> {
        // loqa-core publishes to stt.text.partial and stt.text.final;
        // callers filter by session_id in the payload
        info!("Subscribing to transcripts on {}", subject);

        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .context("Failed to subscribe to transcripts")?;

        Ok(subscriber)
    }

    /// Ask the TTS service to speak one utterance and wait for it to finish
    pub async fn request_speech(
        &self,
        subject: &str,
        request: &SpeakRequest,
        timeout: Duration,
    ) -> Result<()> {
        let payload = serde_json::to_vec(request)?;

        debug!(
            "Requesting speech on {} (utterance={}, chars={})",
            subject,
            request.utterance_id,
            request.text.len()
        );

        let response = tokio::time::timeout(
            timeout,
            self.client.request(subject.to_string(), payload.into()),
        )
        .await
        .context("Timed out waiting for speech synthesis")?
        .context("Speech request failed")?;

        let reply: SpeakReply =
            serde_json::from_slice(&response.payload).context("Invalid speech reply")?;

        if !reply.ok {
            bail!(
                "Speech synthesis failed: {}",
                reply.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }

        Ok(())
    }
}
