//! Message parser - Extracts text and chat commands from inbound messages

use crate::domain::entities::InboundMessage;

/// Commands understood in chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    /// Make the current chat the notification destination
    Group,
}

impl ChatCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ChatCommand::Group => "/group",
        }
    }
}

/// Parses inbound messages into commands
pub struct MessageParser;

impl MessageParser {
    /// Plain text first, then extended text, else empty
    pub fn extract_text(message: &InboundMessage) -> &str {
        [&message.conversation, &message.extended_text]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|text| !text.is_empty())
            .unwrap_or("")
    }

    /// Recognize a command; the whole trimmed text must match, any case
    pub fn parse_command(text: &str) -> Option<ChatCommand> {
        let text = text.trim();
        if text.eq_ignore_ascii_case(ChatCommand::Group.name()) {
            Some(ChatCommand::Group)
        } else {
            None
        }
    }

    pub fn parse(message: &InboundMessage) -> Option<ChatCommand> {
        Self::parse_command(Self::extract_text(message))
    }
}
