//! Console adapter for development/testing
//!
//! Every stdin line is an inbound message. `join <jid>` simulates being added
//! to a group and `<jid>> text` posts `text` from that chat.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::application::errors::TransportError;
use crate::domain::entities::{Destination, InboundMessage};
use crate::domain::traits::{SessionTransport, TransportEvent};

/// Chat used for lines without an explicit `<jid>>` prefix
pub const CONSOLE_CHAT: &str = "console@s.whatsapp.net";

/// Console session adapter for local development
#[derive(Default)]
pub struct ConsoleTransport;

impl ConsoleTransport {
    pub fn new() -> Self {
        Self
    }

    /// Turn one input line into an event
    pub fn parse_line(line: &str) -> Option<TransportEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(group) = line.strip_prefix("join ") {
            return group.parse().ok().map(TransportEvent::GroupJoined);
        }

        let (chat, text): (Destination, &str) = match line.split_once("> ") {
            Some((jid, text)) => (jid.parse().ok()?, text),
            None => (CONSOLE_CHAT.parse().ok()?, line),
        };
        Some(TransportEvent::Message(InboundMessage::text(chat, text)))
    }
}

#[async_trait]
impl SessionTransport for ConsoleTransport {
    async fn connect(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), TransportError> {
        tracing::info!("Starting console session (dev mode)");
        events.send(TransportEvent::Connected).await.map_err(|_| TransportError::Closed)?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?
        {
            match Self::parse_line(&line) {
                Some(event) => events.send(event).await.map_err(|_| TransportError::Closed)?,
                None => tracing::debug!("Ignoring console line: {}", line),
            }
        }

        Ok(())
    }

    async fn send_text(&self, to: &Destination, text: &str) -> Result<(), TransportError> {
        println!("[BOT -> {}] {}", to, text);
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
