//! Transcript capture
//!
//! A `TranscriptSource` wraps a continuous speech-to-text capability. Results,
//! errors and end-of-capture are reported through the session's `EventSink`:
//! - `CaptureResult { text, is_final }` for every recognized segment
//! - `CaptureError(..)` when recognition fails
//! - `CaptureEnded` when the recognizer stops on its own (or after `stop`)

pub mod nats;
pub mod transcript;

pub use nats::{NatsCaptureFactory, NatsTranscriptSource};
pub use transcript::TranscriptAccumulator;

use crate::error::CaptureError;
use crate::session::EventSink;
use anyhow::Result;

/// Continuous speech-to-text capture
#[async_trait::async_trait]
pub trait TranscriptSource: Send {
    /// Begin recognizing; failing here is treated like a capture error
    async fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop listening and let pending results arrive
    async fn stop(&mut self) -> Result<()>;

    /// Stop immediately, discarding pending results
    async fn abort(&mut self) -> Result<()>;

    /// Check if capture is currently running
    fn is_capturing(&self) -> bool;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// Creates one transcript source per interaction
pub trait CaptureFactory: Send + Sync {
    fn create(&self, events: EventSink) -> Result<Box<dyn TranscriptSource>, CaptureError>;
}
