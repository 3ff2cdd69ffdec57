use super::queue::Utterance;
use crate::session::{EventSink, SessionEvent};
use anyhow::Result;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Speech synthesis device.
///
/// `speak` starts one utterance and returns; completion is reported later as
/// `UtteranceFinished` or `UtteranceFailed` carrying the utterance id. The
/// orchestrator never calls `speak` again before that report arrives.
#[async_trait::async_trait]
pub trait SpeechPlayer: Send {
    /// Start speaking; an error means the utterance never started
    async fn speak(&mut self, utterance: Utterance, events: EventSink) -> Result<()>;

    /// Stop the current utterance without reporting completion
    async fn cancel(&mut self) -> Result<()>;

    /// Get player name for logging
    fn name(&self) -> &str;
}

/// Prints sentences to stdout, holding each one for roughly as long as it
/// would take to say aloud.
pub struct ConsoleSpeechPlayer {
    words_per_minute: u32,
    current: Option<JoinHandle<()>>,
}

impl ConsoleSpeechPlayer {
    pub fn new(words_per_minute: u32) -> Self {
        Self {
            words_per_minute,
            current: None,
        }
    }

    /// Time to say `text` at the configured pace (zero pace means instant)
    pub fn speaking_time(&self, text: &str) -> Duration {
        if self.words_per_minute == 0 {
            return Duration::ZERO;
        }
        let words = text.split_whitespace().count() as u64;
        Duration::from_millis(words * 60_000 / self.words_per_minute as u64)
    }
}

#[async_trait::async_trait]
impl SpeechPlayer for ConsoleSpeechPlayer {
    async fn speak(&mut self, utterance: Utterance, events: EventSink) -> Result<()> {
        let pause = self.speaking_time(&utterance.text);

        println!("AI: {}", utterance.text);

        self.current = Some(tokio::spawn(async move {
            tokio::time::sleep(pause).await;
            events.emit(SessionEvent::UtteranceFinished { id: utterance.id });
        }));

        Ok(())
    }

    async fn cancel(&mut self) -> Result<()> {
        if let Some(task) = self.current.take() {
            info!("Cancelling console speech");
            task.abort();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
