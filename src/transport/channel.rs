use super::messages::ClientMessage;
use crate::session::EventSink;
use anyhow::Result;

/// One duplex connection to the remote voice endpoint.
///
/// Opening, inbound messages, errors and closing are reported through the
/// `EventSink` given to the connector; this handle only carries outbound traffic.
#[async_trait::async_trait]
pub trait DuplexChannel: Send {
    /// Queue a message for the remote endpoint
    async fn send(&mut self, message: ClientMessage) -> Result<()>;

    /// Close the connection; closing twice is a no-op
    async fn close(&mut self) -> Result<()>;

    /// Check if the connection is open and not yet closed
    fn is_open(&self) -> bool;

    /// Get channel name for logging
    fn name(&self) -> &str;
}

/// Creates duplex channels, one per interaction
#[async_trait::async_trait]
pub trait ChannelConnector: Send + Sync {
    /// Create the connection object.
    ///
    /// An error means the connection could not even be constructed; a
    /// connection that fails later reports `TransportError` through `events`.
    async fn connect(&self, events: EventSink) -> Result<Box<dyn DuplexChannel>>;
}
