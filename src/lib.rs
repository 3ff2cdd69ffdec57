pub mod capture;
pub mod config;
pub mod error;
pub mod http;
pub mod nats;
pub mod playback;
pub mod session;
pub mod transport;

pub use capture::{CaptureFactory, NatsCaptureFactory, TranscriptAccumulator, TranscriptSource};
pub use config::Config;
pub use error::CaptureError;
pub use http::{create_router, AppState};
pub use nats::{NatsClient, TranscriptMessage};
pub use playback::{
    ConsoleSpeechPlayer, NatsSpeechPlayer, PlaybackQueue, SentenceSegmenter, SpeechPlayer,
    Utterance,
};
pub use session::{
    EventSink, Orchestrator, RestartPolicy, Session, SessionConfig, SessionEvent,
    SessionSnapshot, SessionStats, SessionStatus, VoiceSession,
};
pub use transport::{
    ChannelConnector, ClientMessage, DuplexChannel, ServerMessage, WebSocketConnector,
};
