//! Reply playback: segmentation, queueing and speech
//!
//! Streamed reply text flows `SentenceSegmenter` -> `PlaybackQueue` ->
//! `SpeechPlayer`, one utterance at a time.

pub mod nats;
pub mod player;
pub mod queue;
pub mod segmenter;

pub use nats::NatsSpeechPlayer;
pub use player::{ConsoleSpeechPlayer, SpeechPlayer};
pub use queue::{PlaybackQueue, Utterance};
pub use segmenter::SentenceSegmenter;
