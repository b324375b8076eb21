use std::sync::Arc;

use serde_json::Value;

use crate::application::errors::RelayError;
use crate::domain::entities::{Destination, IssueEvent};
use crate::domain::traits::MessageSender;

use super::formatter::{self, NotificationFormatter};
use super::resolver::DestinationResolver;

/// Message used by the manual send path when none is given
pub const DEFAULT_TEST_MESSAGE: &str = "🧪 Mensaje de prueba";

/// Outcome of a webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent { key: String, destination: Destination },
    Ignored { event_kind: String },
}

/// Service relaying issue events to the active destination
pub struct NotificationService {
    sender: Arc<dyn MessageSender>,
    resolver: DestinationResolver,
    formatter: NotificationFormatter,
}

impl NotificationService {
    pub fn new(sender: Arc<dyn MessageSender>, resolver: DestinationResolver, formatter: NotificationFormatter) -> Self {
        Self {
            sender,
            resolver,
            formatter,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.sender.is_connected()
    }

    /// Relay a webhook payload. Only issue creation is delivered.
    pub async fn relay(&self, payload: &Value) -> Result<Delivery, RelayError> {
        if payload.as_object().filter(|o| !o.is_empty()).is_none() {
            return Err(RelayError::InvalidPayload("No data provided".to_string()));
        }

        let event = IssueEvent::from_payload(payload);
        tracing::info!("Webhook received: {}", event.event_kind.as_deref().unwrap_or(""));

        if !event.is_issue_created() {
            let event_kind = event.event_kind.unwrap_or_default();
            tracing::info!("Event ignored: {}", event_kind);
            return Ok(Delivery::Ignored { event_kind });
        }

        let destination = self.resolver.resolve().await.ok_or_else(|| {
            tracing::error!("No destination configured; add the bot to a group and send /group or set WHATSAPP_GROUP_JID");
            RelayError::NoDestination
        })?;

        let text = self.formatter.format(&event);
        self.sender.send(&destination, &text).await?;

        let key = event.key.unwrap_or_else(|| formatter::DEFAULT_KEY.to_string());
        tracing::info!("Notification sent for ticket {}", key);
        Ok(Delivery::Sent { key, destination })
    }

    /// Manual send: explicit destination, else whatever the resolver picks
    pub async fn send_manual(&self, jid: Option<&str>, message: Option<&str>) -> Result<Destination, RelayError> {
        let destination: Destination = match jid.map(str::trim).filter(|j| !j.is_empty()) {
            Some(jid) => jid.parse()?,
            None => self.resolver.resolve().await.ok_or(RelayError::NoDestination)?,
        };
        let text = message.unwrap_or(DEFAULT_TEST_MESSAGE);

        self.sender.send(&destination, text).await?;
        Ok(destination)
    }
}
