use super::{CaptureFactory, TranscriptSource};
use crate::error::CaptureError;
use crate::nats::{NatsClient, TranscriptMessage};
use crate::session::{EventSink, SessionEvent};
use anyhow::Result;
use futures::stream::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Creates transcript sources that follow the loqa STT service over NATS
#[derive(Debug, Clone)]
pub struct NatsCaptureFactory {
    nats_url: String,
    subject: String,
    session_id: String,
}

impl NatsCaptureFactory {
    pub fn new(nats_url: impl Into<String>, subject: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            nats_url: nats_url.into(),
            subject: subject.into(),
            session_id: session_id.unwrap_or_else(|| format!("voice-{}", uuid::Uuid::new_v4())),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl CaptureFactory for NatsCaptureFactory {
    fn create(&self, events: EventSink) -> Result<Box<dyn TranscriptSource>, CaptureError> {
        Ok(Box::new(NatsTranscriptSource {
            nats_url: self.nats_url.clone(),
            subject: self.subject.clone(),
            session_id: self.session_id.clone(),
            events,
            capturing: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
            task: None,
        }))
    }
}

/// Transcript source fed by STT results published on NATS
pub struct NatsTranscriptSource {
    nats_url: String,
    subject: String,
    session_id: String,
    events: EventSink,
    capturing: Arc<AtomicBool>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

#[async_trait::async_trait]
impl TranscriptSource for NatsTranscriptSource {
    async fn start(&mut self) -> Result<(), CaptureError> {
        if self.task.is_some() {
            return Err(CaptureError::StartFailed("capture already started".to_string()));
        }

        let client = NatsClient::connect(&self.nats_url)
            .await
            .map_err(|e| CaptureError::ServiceUnavailable(format!("{:#}", e)))?;

        let mut subscriber = client
            .subscribe_transcripts(&self.subject)
            .await
            .map_err(|e| CaptureError::ServiceUnavailable(format!("{:#}", e)))?;

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let events = self.events.clone();
        let capturing = Arc::clone(&self.capturing);
        let session_id = self.session_id.clone();

        capturing.store(true, Ordering::SeqCst);

        let task = tokio::spawn(async move {
            info!("Transcript capture started for {}", session_id);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        if let Err(e) = subscriber.unsubscribe().await {
                            warn!("Failed to unsubscribe from transcripts: {}", e);
                        }
                        break;
                    }
                    msg = subscriber.next() => {
                        let Some(msg) = msg else {
                            break;
                        };

                        match serde_json::from_slice::<TranscriptMessage>(&msg.payload) {
                            Ok(transcript) => {
                                // Filter by session_id
                                if transcript.session_id != session_id {
                                    continue;
                                }

                                events.emit(SessionEvent::CaptureResult {
                                    text: transcript.text,
                                    is_final: !transcript.partial,
                                });
                            }
                            Err(e) => {
                                warn!("Failed to parse transcript message: {}", e);
                            }
                        }
                    }
                }
            }

            capturing.store(false, Ordering::SeqCst);
            info!("Transcript capture ended for {}", session_id);
            events.emit(SessionEvent::CaptureEnded);
        });

        self.stop_tx = Some(stop_tx);
        self.task = Some(task);

        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        Ok(())
    }

    async fn abort(&mut self) -> Result<()> {
        self.stop_tx = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "nats-stt"
    }
}
