//! HTTP session bridge adapter
//!
//! Talks to a bridge process that holds the actual messaging session:
//! `POST /sessions/{name}/connect`, long-poll `GET /sessions/{name}/events`,
//! `POST /sessions/{name}/messages`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::errors::TransportError;
use crate::domain::entities::{Destination, InboundMessage};
use crate::domain::traits::{SessionTransport, TransportEvent};

/// Consecutive poll failures tolerated before the session is given up
const MAX_POLL_FAILURES: u32 = 5;

const POLL_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Bridge event envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeEvent {
    pub id: i64,
    #[serde(flatten)]
    pub kind: BridgeEventKind,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEventKind {
    Qr {
        code: String,
    },
    Connected,
    Disconnected {
        #[serde(default)]
        reason: Option<String>,
    },
    JoinedGroup {
        group: String,
    },
    Message {
        chat: String,
        #[serde(default)]
        sender: Option<String>,
        #[serde(default)]
        from_me: bool,
        #[serde(default)]
        conversation: Option<String>,
        #[serde(default)]
        extended_text: Option<String>,
    },
}

impl BridgeEventKind {
    /// Convert to a transport event; JIDs that do not parse are an error
    pub fn into_transport_event(self) -> Result<TransportEvent, TransportError> {
        let parse = |jid: &str| -> Result<Destination, TransportError> {
            jid.parse()
                .map_err(|e| TransportError::Parse(format!("bad jid '{}': {}", jid, e)))
        };

        Ok(match self {
            BridgeEventKind::Qr { code } => TransportEvent::PairingCode(code),
            BridgeEventKind::Connected => TransportEvent::Connected,
            BridgeEventKind::Disconnected { reason } => TransportEvent::Disconnected {
                reason: reason.unwrap_or_else(|| "closed by bridge".to_string()),
            },
            BridgeEventKind::JoinedGroup { group } => TransportEvent::GroupJoined(parse(&group)?),
            BridgeEventKind::Message {
                chat,
                sender,
                from_me,
                conversation,
                extended_text,
            } => TransportEvent::Message(InboundMessage {
                chat: parse(&chat)?,
                sender: sender.as_deref().map(parse).transpose()?,
                is_from_me: from_me,
                conversation,
                extended_text,
            }),
        })
    }
}

/// Session bridge adapter
pub struct BridgeTransport {
    base_url: String,
    session: String,
    store_path: PathBuf,
    poll_timeout: Duration,
    client: Client,
}

impl BridgeTransport {
    pub fn new(base_url: impl Into<String>, session: impl Into<String>, store_path: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: session.into(),
            store_path: store_path.into(),
            poll_timeout: Duration::from_secs(30),
            client: Client::new(),
        }
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Get the API URL for a session method
    fn api_url(&self, method: &str) -> String {
        format!("{}/sessions/{}/{}", self.base_url, self.session, method)
    }

    /// Ask the bridge to open (or resume) the session
    async fn open_session(&self) -> Result<(), TransportError> {
        #[derive(Serialize)]
        struct ConnectRequest {
            store_path: String,
        }

        let request = ConnectRequest {
            store_path: self.store_path.to_string_lossy().into_owned(),
        };

        let response = self
            .client
            .post(self.api_url("connect"))
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected(format!("{}: {}", status, body)));
        }

        Ok(())
    }

    /// Long-poll the bridge for events after `offset`
    pub async fn get_events(&self, offset: i64) -> Result<Vec<BridgeEvent>, TransportError> {
        #[derive(Deserialize)]
        struct Response {
            result: Vec<BridgeEvent>,
        }

        let response = self
            .client
            .get(self.api_url("events"))
            .query(&[("offset", offset), ("timeout", self.poll_timeout.as_secs() as i64)])
            .timeout(self.poll_timeout + Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Network(format!("Bridge API error: {}", response.status())));
        }

        let data: Response = response
            .json()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))?;

        Ok(data.result)
    }

    /// Get the next event offset
    pub fn next_offset(events: &[BridgeEvent], current: i64) -> i64 {
        events.iter().map(|e| e.id + 1).max().unwrap_or(current).max(current)
    }
}

#[async_trait]
impl SessionTransport for BridgeTransport {
    async fn connect(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), TransportError> {
        tracing::info!("Connecting to session bridge at {} (session: {})", self.base_url, self.session);
        self.open_session().await?;

        let mut offset = 0;
        let mut failures = 0;

        loop {
            let batch = match self.get_events(offset).await {
                Ok(batch) => {
                    failures = 0;
                    batch
                }
                Err(e) => {
                    failures += 1;
                    if failures >= MAX_POLL_FAILURES {
                        return Err(e);
                    }
                    tracing::warn!("Bridge poll failed ({}/{}): {}", failures, MAX_POLL_FAILURES, e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            offset = Self::next_offset(&batch, offset);

            for event in batch {
                let event = match event.kind.into_transport_event() {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("Skipping bridge event {}: {}", event.id, e);
                        continue;
                    }
                };

                let closes = matches!(event, TransportEvent::Disconnected { .. });
                events.send(event).await.map_err(|_| TransportError::Closed)?;
                if closes {
                    return Ok(());
                }
            }
        }
    }

    async fn send_text(&self, to: &Destination, text: &str) -> Result<(), TransportError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            to: String,
            text: &'a str,
        }

        let request = SendMessageRequest {
            to: to.to_string(),
            text,
        };

        let response = self
            .client
            .post(self.api_url("messages"))
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Network(format!("Bridge API error: {}", response.status())));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "bridge"
    }
}
