use crate::error::CaptureError;
use crate::transport::ServerMessage;
use tokio::sync::mpsc;
use tracing::debug;

/// Something that happened to one of the session's resources
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TransportOpened,
    TransportMessage(ServerMessage),
    TransportError(String),
    TransportClosed,
    CaptureResult { text: String, is_final: bool },
    CaptureError(CaptureError),
    CaptureEnded,
    UtteranceFinished { id: u64 },
    UtteranceFailed { id: u64, reason: String },
}

/// Request from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    /// Release everything and return to idle (hosting view torn down)
    Reset,
    /// Reset, then stop the session task
    Shutdown,
}

/// Everything the session task consumes, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Command(Command),
    Event { epoch: u64, event: SessionEvent },
}

/// Sender handed to transport, capture and speech handles.
///
/// Stamped with the epoch of the session that created the handle so events
/// from released handles can be told apart and dropped.
#[derive(Debug, Clone)]
pub struct EventSink {
    epoch: u64,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl EventSink {
    pub fn new(epoch: u64, tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { epoch, tx }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn emit(&self, event: SessionEvent) {
        if self
            .tx
            .send(Envelope::Event {
                epoch: self.epoch,
                event,
            })
            .is_err()
        {
            debug!("Session task gone, dropping event");
        }
    }

    /// Whether the session task is still receiving
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
