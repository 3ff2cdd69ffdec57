use super::player::SpeechPlayer;
use super::queue::Utterance;
use crate::nats::{NatsClient, SpeakRequest};
use crate::session::{EventSink, SessionEvent};
use anyhow::Result;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Speaks through a TTS service that answers `SpeakRequest`s once the audio
/// has played.
pub struct NatsSpeechPlayer {
    nats_url: String,
    subject: String,
    session_id: String,
    timeout: Duration,
    client: Option<NatsClient>,
    current: Option<JoinHandle<()>>,
}

impl NatsSpeechPlayer {
    pub fn new(
        nats_url: impl Into<String>,
        subject: impl Into<String>,
        session_id: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            nats_url: nats_url.into(),
            subject: subject.into(),
            session_id: session_id.into(),
            timeout,
            client: None,
            current: None,
        }
    }

    async fn client(&mut self) -> Result<NatsClient> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = NatsClient::connect(&self.nats_url).await?;
        self.client = Some(client.clone());
        Ok(client)
    }
}

#[async_trait::async_trait]
impl SpeechPlayer for NatsSpeechPlayer {
    async fn speak(&mut self, utterance: Utterance, events: EventSink) -> Result<()> {
        let client = self.client().await?;
        let subject = self.subject.clone();
        let timeout = self.timeout;
        let request = SpeakRequest {
            session_id: self.session_id.clone(),
            utterance_id: utterance.id,
            text: utterance.text,
        };

        self.current = Some(tokio::spawn(async move {
            match client.request_speech(&subject, &request, timeout).await {
                Ok(()) => events.emit(SessionEvent::UtteranceFinished {
                    id: request.utterance_id,
                }),
                Err(e) => {
                    warn!("Speech request {} failed: {:#}", request.utterance_id, e);
                    events.emit(SessionEvent::UtteranceFailed {
                        id: request.utterance_id,
                        reason: format!("{:#}", e),
                    });
                }
            }
        }));

        Ok(())
    }

    async fn cancel(&mut self) -> Result<()> {
        if let Some(task) = self.current.take() {
            info!("Cancelling speech request");
            task.abort();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "nats-tts"
    }
}
