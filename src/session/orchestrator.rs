use super::config::{RestartPolicy, SessionConfig};
use super::event::{Command, Envelope, EventSink, SessionEvent};
use super::state::{Session, SessionSnapshot, SessionStatus};
use super::stats::SessionStats;
use crate::capture::{CaptureFactory, TranscriptAccumulator, TranscriptSource};
use crate::playback::{PlaybackQueue, SentenceSegmenter, SpeechPlayer, Utterance};
use crate::transport::{ChannelConnector, ClientMessage, DuplexChannel, ServerMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Shown when the transport fails without saying why
const CONNECTION_FAILED: &str = "Connection to the voice service failed.";

/// Owns one voice session and every resource attached to it.
///
/// All state changes happen in `dispatch`, one envelope at a time. Transport,
/// capture and speech handles report back through an `EventSink` stamped with
/// the current epoch; releasing resources bumps the epoch so anything a
/// released handle still emits is dropped.
pub struct Orchestrator {
    config: SessionConfig,
    connector: Arc<dyn ChannelConnector>,
    capture_factory: Arc<dyn CaptureFactory>,
    player: Box<dyn SpeechPlayer>,

    session: Session,
    stats: SessionStats,
    epoch: u64,

    transport: Option<Box<dyn DuplexChannel>>,
    transport_closed: bool,

    capture: Option<Box<dyn TranscriptSource>>,
    /// Started and not yet stopped, aborted or ended
    capture_active: bool,
    transcript: TranscriptAccumulator,

    segmenter: SentenceSegmenter,
    queue: PlaybackQueue,

    tx: mpsc::UnboundedSender<Envelope>,
    rx: mpsc::UnboundedReceiver<Envelope>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl Orchestrator {
    pub fn new(
        config: SessionConfig,
        connector: Arc<dyn ChannelConnector>,
        capture_factory: Arc<dyn CaptureFactory>,
        player: Box<dyn SpeechPlayer>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());

        info!(
            "Voice orchestrator initialized (player={}, restart={:?})",
            player.name(),
            config.restart_policy
        );

        Self {
            config,
            connector,
            capture_factory,
            player,
            session: Session::idle(),
            stats: SessionStats::default(),
            epoch: 0,
            transport: None,
            transport_closed: false,
            capture: None,
            capture_active: false,
            transcript: TranscriptAccumulator::new(),
            segmenter: SentenceSegmenter::new(),
            queue: PlaybackQueue::new(),
            tx,
            rx,
            snapshot_tx,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.session.status,
            transcript: self.session.transcript.clone(),
            ai_response_text: self.session.ai_response_text.clone(),
            error: self.session.error.clone(),
            stats: self.stats.clone(),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    pub fn has_capture(&self) -> bool {
        self.capture.is_some()
    }

    /// Sentences waiting behind the in-flight utterance
    pub fn queued_sentences(&self) -> Vec<String> {
        self.queue.pending().map(str::to_string).collect()
    }

    pub fn in_flight(&self) -> Option<&Utterance> {
        self.queue.in_flight()
    }

    /// Reply text not yet terminated by a sentence boundary
    pub fn buffered_text(&self) -> &str {
        self.segmenter.buffer()
    }

    /// Sender for commands; the session task consumes them in order with events
    pub fn sender(&self) -> mpsc::UnboundedSender<Envelope> {
        self.tx.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    fn sink(&self) -> EventSink {
        EventSink::new(self.epoch, self.tx.clone())
    }

    // ------------------------------------------------------------------
    // Driving
    // ------------------------------------------------------------------

    /// Consume envelopes until a `Shutdown` command arrives
    pub async fn run(mut self) {
        info!("Voice session task started");

        while let Some(envelope) = self.rx.recv().await {
            if !self.dispatch(envelope).await {
                break;
            }
        }

        info!("Voice session task stopped");
    }

    /// Dispatch everything already queued, without waiting for more.
    ///
    /// Returns the number of envelopes handled.
    pub async fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            handled += 1;
            if !self.dispatch(envelope).await {
                break;
            }
        }
        handled
    }

    /// Apply one envelope; returns `false` once the session should shut down
    pub async fn dispatch(&mut self, envelope: Envelope) -> bool {
        let keep_running = match envelope {
            Envelope::Command(command) => self.handle_command(command).await,
            Envelope::Event { epoch, event } => {
                if epoch == self.epoch {
                    self.handle_event(event).await;
                } else {
                    debug!(
                        "Dropping event from released session (epoch {} != {}): {:?}",
                        epoch, self.epoch, event
                    );
                }
                true
            }
        };

        self.snapshot_tx.send_replace(self.snapshot());

        keep_running
    }

    async fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start_interaction().await,
            Command::Stop => self.stop_interaction().await,
            Command::Reset => self.teardown().await,
            Command::Shutdown => {
                self.teardown().await;
                return false;
            }
        }
        true
    }

    // ------------------------------------------------------------------
    // Public entry points
    // ------------------------------------------------------------------

    /// Begin a new interaction: connect, then listen once the connection opens
    pub async fn start_interaction(&mut self) {
        let status = self.session.status;

        if !status.accepts_start() {
            if status == SessionStatus::Connecting
                || self.config.restart_policy == RestartPolicy::Ignore
            {
                debug!("Ignoring start while {}", status);
                return;
            }

            info!("Replacing interaction that is {}", status);
            self.teardown().await;
        }

        // An errored session has already released its handles
        self.release().await;

        self.session = Session {
            status: SessionStatus::Connecting,
            transcript: None,
            ai_response_text: None,
            error: None,
        };
        self.stats = SessionStats::started_now();
        self.transport_closed = false;

        info!("Starting voice interaction (epoch {})", self.epoch);

        match self.connector.connect(self.sink()).await {
            Ok(channel) => {
                debug!("Created {} channel", channel.name());
                self.transport = Some(channel);
            }
            Err(e) => {
                self.fail(format!("Could not connect to the voice service: {:#}", e))
                    .await;
            }
        }
    }

    /// The user finished speaking: send what was heard and wait for the reply
    pub async fn stop_interaction(&mut self) {
        if self.session.status != SessionStatus::Listening {
            debug!("Ignoring stop while {}", self.session.status);
            return;
        }

        self.stop_capture().await;

        let transcript = self.transcript.current().trim().to_string();
        if transcript.is_empty() {
            info!("No speech captured, ending interaction");
            self.teardown().await;
            return;
        }

        self.session.transcript = Some(transcript.clone());
        self.session.status = SessionStatus::Processing;

        info!("Sending transcript ({} chars)", transcript.len());

        let sent = match self.transport.as_mut() {
            Some(transport) => transport
                .send(ClientMessage::UserTranscript(transcript))
                .await,
            None => Err(anyhow::anyhow!("no voice connection")),
        };

        if let Err(e) = sent {
            self.fail(format!("Failed to send transcript: {:#}", e)).await;
        }
    }

    /// Release every resource and return to idle. Safe to call in any state.
    pub async fn teardown(&mut self) {
        if self.session.status != SessionStatus::Idle {
            info!("Tearing down voice session ({})", self.session.status);
        }

        self.release().await;
        self.session = Session::idle();
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::TransportOpened => self.on_transport_open().await,
            SessionEvent::TransportMessage(message) => self.on_server_message(message).await,
            SessionEvent::TransportError(reason) => {
                let message = if reason.trim().is_empty() {
                    CONNECTION_FAILED.to_string()
                } else {
                    reason
                };
                self.fail(message).await;
            }
            SessionEvent::TransportClosed => {
                info!("Voice connection closed by remote");
                self.transport_closed = true;
                if self.queue.is_idle() {
                    self.teardown().await;
                }
            }
            SessionEvent::CaptureResult { text, is_final } => {
                if self.session.status != SessionStatus::Listening {
                    debug!("Ignoring transcript while {}", self.session.status);
                    return;
                }
                let current = self.transcript.apply(&text, is_final);
                if !current.is_empty() {
                    self.session.transcript = Some(current);
                }
            }
            SessionEvent::CaptureError(err) => {
                if !self.capture_active {
                    debug!("Ignoring capture error after capture stopped: {}", err);
                    return;
                }
                error!("Capture error: {}", err);
                self.fail(err.user_message()).await;
            }
            SessionEvent::CaptureEnded => {
                // Keep the transcript; the user still has to stop explicitly
                if self.capture_active {
                    info!("Capture ended on its own");
                }
                self.capture_active = false;
            }
            SessionEvent::UtteranceFinished { id } => match self.queue.complete(id) {
                Some(utterance) => {
                    self.session.append_response(&utterance.text);
                    self.stats.utterances_spoken += 1;
                    self.advance_playback().await;
                }
                None => debug!("Ignoring completion of utterance {}", id),
            },
            SessionEvent::UtteranceFailed { id, reason } => match self.queue.complete(id) {
                Some(utterance) => {
                    warn!("Skipping sentence {:?}: {}", utterance.text, reason);
                    self.stats.utterances_failed += 1;
                    self.advance_playback().await;
                }
                None => debug!("Ignoring failure of utterance {}", id),
            },
        }
    }

    async fn on_transport_open(&mut self) {
        if self.session.status != SessionStatus::Connecting {
            debug!("Ignoring open while {}", self.session.status);
            return;
        }

        let sent = match self.transport.as_mut() {
            Some(transport) => transport.send(ClientMessage::Start).await,
            None => Err(anyhow::anyhow!("no voice connection")),
        };
        if let Err(e) = sent {
            self.fail(format!("Failed to start voice session: {:#}", e)).await;
            return;
        }

        let mut capture = match self.capture_factory.create(self.sink()) {
            Ok(capture) => capture,
            Err(err) => {
                error!("Failed to create transcript source: {}", err);
                self.fail(err.user_message()).await;
                return;
            }
        };

        if let Err(err) = capture.start().await {
            error!("Failed to start {} capture: {}", capture.name(), err);
            self.capture = Some(capture);
            self.fail(err.user_message()).await;
            return;
        }

        info!("Listening via {}", capture.name());
        self.capture = Some(capture);
        self.capture_active = true;
        self.session.status = SessionStatus::Listening;
    }

    async fn on_server_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::AiChunk(text) => {
                if matches!(
                    self.session.status,
                    SessionStatus::Listening | SessionStatus::Processing
                ) {
                    self.session.status = SessionStatus::Speaking;
                }

                for sentence in self.segmenter.push(&text) {
                    self.enqueue(sentence);
                }
                self.advance_playback().await;
            }
            ServerMessage::AiDone => {
                self.stats.turns_completed += 1;
                if let Some(sentence) = self.segmenter.flush() {
                    self.enqueue(sentence);
                }
                self.advance_playback().await;
            }
            ServerMessage::Error(message) => {
                error!("Voice service error: {}", message);
                self.fail(message).await;
            }
        }
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    fn enqueue(&mut self, sentence: String) {
        debug!("Queued sentence: {:?}", sentence);
        self.stats.sentences_queued += 1;
        self.queue.enqueue(sentence);
    }

    /// Speak the queue head if nothing is playing; end the session once the
    /// queue has drained and the remote side has closed.
    async fn advance_playback(&mut self) {
        while let Some(utterance) = self.queue.next() {
            let id = utterance.id;
            let sink = self.sink();

            match self.player.speak(utterance, sink).await {
                Ok(()) => return,
                Err(e) => {
                    warn!("Failed to start utterance {}: {:#}", id, e);
                    self.queue.complete(id);
                    self.stats.utterances_failed += 1;
                }
            }
        }

        if self.transport_closed && self.queue.is_idle() {
            info!("Reply finished and connection closed");
            self.teardown().await;
        }
    }

    // ------------------------------------------------------------------
    // Resource release
    // ------------------------------------------------------------------

    async fn stop_capture(&mut self) {
        if let Some(capture) = self.capture.as_mut() {
            if let Err(e) = capture.stop().await {
                warn!("Failed to stop {} capture: {:#}", capture.name(), e);
            }
        }
        self.capture_active = false;
    }

    /// Close the transport, abort capture, cancel speech and empty buffers.
    /// Everything emitted by the released handles afterwards is stale.
    async fn release(&mut self) {
        self.epoch += 1;

        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!("Failed to close {} channel: {:#}", transport.name(), e);
            }
        }
        self.transport_closed = false;

        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.abort().await {
                warn!("Failed to abort {} capture: {:#}", capture.name(), e);
            }
        }
        self.capture_active = false;

        if !self.queue.is_idle() {
            if let Err(e) = self.player.cancel().await {
                warn!("Failed to cancel {} speech: {:#}", self.player.name(), e);
            }
        }
        self.queue.clear();
        self.segmenter.reset();
        self.transcript.clear();
    }

    /// Release resources and park in `Error` until the next start
    async fn fail(&mut self, message: String) {
        error!("Voice session failed: {}", message);
        self.release().await;
        self.session.status = SessionStatus::Error;
        self.session.error = Some(message);
    }
}
