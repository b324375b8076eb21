//! Application layer errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the relay pipeline (webhook -> formatter -> send)
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("No destination configured: add the bot to a group and send /group, or set WHATSAPP_GROUP_JID")]
    NoDestination,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid destination: {0}")]
    Destination(#[from] DestinationError),

    #[error("Send failed: {0}")]
    Send(#[from] SendError),
}

/// Outbound message errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("Session is not connected")]
    NotConnected,

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Session transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Session rejected: {0}")]
    Rejected(String),

    #[error("Event channel closed")]
    Closed,
}

/// Destination parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DestinationError {
    #[error("destination is empty")]
    Empty,

    #[error("destination '{0}' has an empty user part")]
    EmptyLocal(String),

    #[error("destination '{0}' has an empty server part")]
    EmptyDomain(String),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
