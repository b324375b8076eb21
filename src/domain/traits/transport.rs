use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::TransportError;
use crate::domain::entities::{Destination, InboundMessage};

/// Raw events emitted by a transport while its session runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// New pairing code to be scanned
    PairingCode(String),
    Connected,
    Disconnected { reason: String },
    GroupJoined(Destination),
    Message(InboundMessage),
}

/// SessionTransport trait - abstraction for messaging platform sessions
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Run the session handshake and event loop.
    ///
    /// Events are pushed into `events` for as long as the session lives.
    /// Returning (with or without an error) means the session is gone.
    async fn connect(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), TransportError>;

    /// Send a text message
    async fn send_text(&self, to: &Destination, text: &str) -> Result<(), TransportError>;

    /// Short adapter name for logs
    fn name(&self) -> &str;
}
