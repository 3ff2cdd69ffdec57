use super::channel::{ChannelConnector, DuplexChannel};
use super::messages::{ClientMessage, ServerMessage};
use crate::session::{EventSink, SessionEvent};
use anyhow::{bail, Context, Result};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

enum Outbound {
    Text(String),
    Close,
}

/// Connects to the voice backend over a WebSocket
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_request(&self) -> Result<Request> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            bail!("Voice endpoint must be a ws:// or wss:// URL: {}", self.url);
        }

        self.url
            .as_str()
            .into_client_request()
            .with_context(|| format!("Invalid voice endpoint URL: {}", self.url))
    }
}

#[async_trait::async_trait]
impl ChannelConnector for WebSocketConnector {
    async fn connect(&self, events: EventSink) -> Result<Box<dyn DuplexChannel>> {
        let request = self.build_request()?;

        info!("Connecting to voice endpoint at {}", self.url);

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run_connection(
            request,
            outbound_rx,
            Arc::clone(&open),
            events,
        ));

        Ok(Box::new(WebSocketChannel {
            url: self.url.clone(),
            outbound: Some(outbound_tx),
            open,
            task,
        }))
    }
}

/// Handle to one WebSocket connection
pub struct WebSocketChannel {
    url: String,
    outbound: Option<mpsc::UnboundedSender<Outbound>>,
    open: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

#[async_trait::async_trait]
impl DuplexChannel for WebSocketChannel {
    async fn send(&mut self, message: ClientMessage) -> Result<()> {
        if !self.is_open() {
            bail!("Voice connection to {} is not open", self.url);
        }

        let text = message.to_json()?;

        self.outbound
            .as_ref()
            .context("Voice connection already closed")?
            .send(Outbound::Text(text))
            .map_err(|_| anyhow::anyhow!("Voice connection task has stopped"))?;

        debug!("Queued {:?} for {}", message, self.url);

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let Some(outbound) = self.outbound.take() else {
            return Ok(());
        };

        if self.open.swap(false, Ordering::SeqCst) {
            info!("Closing voice connection to {}", self.url);
            let _ = outbound.send(Outbound::Close);
        } else {
            // Still handshaking
            self.task.abort();
        }

        Ok(())
    }

    fn is_open(&self) -> bool {
        self.outbound.is_some() && self.open.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "websocket"
    }
}

async fn run_connection(
    request: Request,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    open: Arc<AtomicBool>,
    events: EventSink,
) {
    let ws_stream = match connect_async(request).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            error!("Failed to connect to voice endpoint: {}", e);
            events.emit(SessionEvent::TransportError(format!(
                "Could not connect to the voice service: {}",
                e
            )));
            events.emit(SessionEvent::TransportClosed);
            return;
        }
    };

    open.store(true, Ordering::SeqCst);
    info!("Voice connection open");
    events.emit(SessionEvent::TransportOpened);

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    loop {
        tokio::select! {
            outgoing = outbound.recv() => match outgoing {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = ws_tx.send(Message::Text(text.into())).await {
                        error!("Failed to send on voice connection: {}", e);
                        events.emit(SessionEvent::TransportError(e.to_string()));
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = ws_tx.close().await;
                    break;
                }
            },
            incoming = ws_rx.next() => match incoming {
                Some(Ok(Message::Text(text))) => match ServerMessage::from_json(text.as_str()) {
                    Ok(message) => events.emit(SessionEvent::TransportMessage(message)),
                    Err(e) => warn!("Failed to parse voice message: {}", e),
                },
                Some(Ok(Message::Close(frame))) => {
                    match frame {
                        Some(frame) => info!("Voice connection closed: {} {}", frame.code, frame.reason),
                        None => info!("Voice connection closed"),
                    }
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    error!("Voice connection error: {}", e);
                    events.emit(SessionEvent::TransportError(e.to_string()));
                    break;
                }
                None => break,
            },
        }
    }

    open.store(false, Ordering::SeqCst);
    events.emit(SessionEvent::TransportClosed);
}
