use std::fmt;

use super::Destination;

/// Connection state of the messaging session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Pairing,
    Connected,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Pairing => "pairing",
            SessionState::Connected => "connected",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scannable pairing payload, only meaningful while pairing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingMaterial(String);

impl PairingMaterial {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Message received from a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Chat the message was posted in (group or direct chat)
    pub chat: Destination,
    pub sender: Option<Destination>,
    pub is_from_me: bool,
    /// Plain text body
    pub conversation: Option<String>,
    /// Text of extended/quoted messages
    pub extended_text: Option<String>,
}

impl InboundMessage {
    pub fn text(chat: Destination, text: impl Into<String>) -> Self {
        Self {
            chat,
            sender: None,
            is_from_me: false,
            conversation: Some(text.into()),
            extended_text: None,
        }
    }

    pub fn from_me(mut self) -> Self {
        self.is_from_me = true;
        self
    }
}

/// Session-level events delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected,
    GroupJoined(Destination),
    MessageReceived(InboundMessage),
}

impl SessionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::Connected => EventKind::Connected,
            SessionEvent::GroupJoined(_) => EventKind::GroupJoined,
            SessionEvent::MessageReceived(_) => EventKind::MessageReceived,
        }
    }
}

/// Subscription slot key; one active handler per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    GroupJoined,
    MessageReceived,
}
