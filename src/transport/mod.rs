//! Duplex transport to the remote voice endpoint
//!
//! - `messages`: JSON wire protocol
//! - `channel`: capability traits the orchestrator talks to
//! - `websocket`: tokio-tungstenite implementation

pub mod channel;
pub mod messages;
pub mod websocket;

pub use channel::{ChannelConnector, DuplexChannel};
pub use messages::{ClientMessage, ServerMessage};
pub use websocket::{WebSocketChannel, WebSocketConnector};
