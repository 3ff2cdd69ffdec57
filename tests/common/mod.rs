// Mock capability implementations shared by the integration tests.
//
// Each mock records what the orchestrator did to it and keeps the EventSink it
// was handed, so tests can play the part of the remote endpoint, the
// recognizer and the speech device.

#![allow(dead_code)]

use anyhow::{bail, Result};
use loqa_voice::{
    CaptureError, CaptureFactory, ChannelConnector, ClientMessage, DuplexChannel, EventSink,
    Orchestrator, ServerMessage, SessionConfig, SessionEvent, SpeechPlayer, TranscriptSource,
    Utterance,
};
use std::sync::{Arc, Mutex};

// ============================================================================
// Transport
// ============================================================================

#[derive(Default)]
pub struct TransportLog {
    pub sinks: Vec<EventSink>,
    pub sent: Vec<ClientMessage>,
    pub created: usize,
    pub closed: usize,
    pub live: usize,
    pub max_live: usize,
}

#[derive(Default, Clone)]
pub struct MockConnector {
    pub log: Arc<Mutex<TransportLog>>,
    pub fail_connect: bool,
    pub fail_send: bool,
}

#[async_trait::async_trait]
impl ChannelConnector for MockConnector {
    async fn connect(&self, events: EventSink) -> Result<Box<dyn DuplexChannel>> {
        if self.fail_connect {
            bail!("connection refused");
        }

        let mut log = self.log.lock().unwrap();
        log.created += 1;
        log.live += 1;
        log.max_live = log.max_live.max(log.live);
        log.sinks.push(events);

        Ok(Box::new(MockChannel {
            log: Arc::clone(&self.log),
            open: true,
            fail_send: self.fail_send,
        }))
    }
}

pub struct MockChannel {
    log: Arc<Mutex<TransportLog>>,
    open: bool,
    fail_send: bool,
}

#[async_trait::async_trait]
impl DuplexChannel for MockChannel {
    async fn send(&mut self, message: ClientMessage) -> Result<()> {
        if !self.open {
            bail!("channel closed");
        }
        if self.fail_send {
            bail!("send failed");
        }
        self.log.lock().unwrap().sent.push(message);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            let mut log = self.log.lock().unwrap();
            log.closed += 1;
            log.live -= 1;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Capture
// ============================================================================

#[derive(Default)]
pub struct CaptureLog {
    pub sinks: Vec<EventSink>,
    pub created: usize,
    pub started: usize,
    pub stopped: usize,
    pub aborted: usize,
    pub live: usize,
    pub max_live: usize,
}

#[derive(Default, Clone)]
pub struct MockCaptureFactory {
    pub log: Arc<Mutex<CaptureLog>>,
    pub fail_create: Option<CaptureError>,
    pub fail_start: Option<CaptureError>,
}

impl CaptureFactory for MockCaptureFactory {
    fn create(&self, events: EventSink) -> Result<Box<dyn TranscriptSource>, CaptureError> {
        if let Some(err) = &self.fail_create {
            return Err(err.clone());
        }

        let mut log = self.log.lock().unwrap();
        log.created += 1;
        log.live += 1;
        log.max_live = log.max_live.max(log.live);
        log.sinks.push(events);

        Ok(Box::new(MockTranscriptSource {
            log: Arc::clone(&self.log),
            fail_start: self.fail_start.clone(),
            capturing: false,
            released: false,
        }))
    }
}

pub struct MockTranscriptSource {
    log: Arc<Mutex<CaptureLog>>,
    fail_start: Option<CaptureError>,
    capturing: bool,
    released: bool,
}

#[async_trait::async_trait]
impl TranscriptSource for MockTranscriptSource {
    async fn start(&mut self) -> Result<(), CaptureError> {
        if let Some(err) = &self.fail_start {
            return Err(err.clone());
        }
        self.capturing = true;
        self.log.lock().unwrap().started += 1;
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing = false;
        self.log.lock().unwrap().stopped += 1;
        Ok(())
    }

    async fn abort(&mut self) -> Result<()> {
        self.capturing = false;
        let mut log = self.log.lock().unwrap();
        log.aborted += 1;
        if !self.released {
            self.released = true;
            log.live -= 1;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Speech
// ============================================================================

#[derive(Default)]
pub struct PlayerLog {
    pub spoken: Vec<String>,
    pub active: Option<(Utterance, EventSink)>,
    /// Set if speak() was called while another utterance was still active
    pub overlapped: bool,
    pub cancelled: usize,
}

#[derive(Default, Clone)]
pub struct MockPlayer {
    pub log: Arc<Mutex<PlayerLog>>,
    /// Sentences whose speak() call fails outright
    pub refuse: Vec<String>,
}

#[async_trait::async_trait]
impl SpeechPlayer for MockPlayer {
    async fn speak(&mut self, utterance: Utterance, events: EventSink) -> Result<()> {
        if self.refuse.contains(&utterance.text) {
            bail!("synthesizer rejected {:?}", utterance.text);
        }

        let mut log = self.log.lock().unwrap();
        if log.active.is_some() {
            log.overlapped = true;
        }
        log.spoken.push(utterance.text.clone());
        log.active = Some((utterance, events));
        Ok(())
    }

    async fn cancel(&mut self) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.active = None;
        log.cancelled += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub orchestrator: Orchestrator,
    pub transport: Arc<Mutex<TransportLog>>,
    pub capture: Arc<Mutex<CaptureLog>>,
    pub player: Arc<Mutex<PlayerLog>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(
            SessionConfig::default(),
            MockConnector::default(),
            MockCaptureFactory::default(),
            MockPlayer::default(),
        )
    }

    pub fn build(
        config: SessionConfig,
        connector: MockConnector,
        capture: MockCaptureFactory,
        player: MockPlayer,
    ) -> Self {
        let transport_log = Arc::clone(&connector.log);
        let capture_log = Arc::clone(&capture.log);
        let player_log = Arc::clone(&player.log);

        Self {
            orchestrator: Orchestrator::new(
                config,
                Arc::new(connector),
                Arc::new(capture),
                Box::new(player),
            ),
            transport: transport_log,
            capture: capture_log,
            player: player_log,
        }
    }

    /// Start and let the connection open; ends up listening
    pub async fn listen(&mut self) {
        self.orchestrator.start_interaction().await;
        self.transport_event(SessionEvent::TransportOpened).await;
    }

    /// Listen, hear `transcript`, and stop; ends up processing
    pub async fn ask(&mut self, transcript: &str) {
        self.listen().await;
        self.capture_event(SessionEvent::CaptureResult {
            text: transcript.to_string(),
            is_final: true,
        })
        .await;
        self.orchestrator.stop_interaction().await;
    }

    pub fn transport_sink(&self) -> EventSink {
        self.transport.lock().unwrap().sinks.last().cloned().expect("no transport created")
    }

    pub fn capture_sink(&self) -> EventSink {
        self.capture.lock().unwrap().sinks.last().cloned().expect("no capture created")
    }

    pub async fn transport_event(&mut self, event: SessionEvent) {
        self.transport_sink().emit(event);
        self.orchestrator.pump().await;
    }

    pub async fn server(&mut self, message: ServerMessage) {
        self.transport_event(SessionEvent::TransportMessage(message)).await;
    }

    pub async fn chunk(&mut self, text: &str) {
        self.server(ServerMessage::AiChunk(text.to_string())).await;
    }

    pub async fn capture_event(&mut self, event: SessionEvent) {
        self.capture_sink().emit(event);
        self.orchestrator.pump().await;
    }

    /// Text of the utterance currently playing
    pub fn speaking(&self) -> Option<String> {
        self.player
            .lock()
            .unwrap()
            .active
            .as_ref()
            .map(|(utterance, _)| utterance.text.clone())
    }

    /// Report the active utterance as finished
    pub async fn finish_utterance(&mut self) {
        let (utterance, sink) = self
            .player
            .lock()
            .unwrap()
            .active
            .take()
            .expect("nothing is being spoken");
        sink.emit(SessionEvent::UtteranceFinished { id: utterance.id });
        self.orchestrator.pump().await;
    }

    /// Report the active utterance as failed
    pub async fn fail_utterance(&mut self, reason: &str) {
        let (utterance, sink) = self
            .player
            .lock()
            .unwrap()
            .active
            .take()
            .expect("nothing is being spoken");
        sink.emit(SessionEvent::UtteranceFailed {
            id: utterance.id,
            reason: reason.to_string(),
        });
        self.orchestrator.pump().await;
    }

    pub fn sent(&self) -> Vec<ClientMessage> {
        self.transport.lock().unwrap().sent.clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.player.lock().unwrap().spoken.clone()
    }
}
