use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::application::errors::DestinationError;

/// Server used when a destination is given without `@`
pub const DEFAULT_USER_SERVER: &str = "s.whatsapp.net";

/// Server of group chats
pub const GROUP_SERVER: &str = "g.us";

/// A messaging address: an individual contact or a group.
///
/// Rendered and parsed as `local@domain`. Both parts are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    local: String,
    domain: String,
}

impl Destination {
    pub fn new(local: impl Into<String>, domain: impl Into<String>) -> Result<Self, DestinationError> {
        let local = local.into().trim().to_string();
        let domain = domain.into().trim().to_string();
        let raw = format!("{}@{}", local, domain);

        if local.is_empty() {
            return Err(DestinationError::EmptyLocal(raw));
        }
        if domain.is_empty() {
            return Err(DestinationError::EmptyDomain(raw));
        }
        Ok(Self { local, domain })
    }

    /// Individual contact on the default server
    pub fn user(local: impl Into<String>) -> Result<Self, DestinationError> {
        Self::new(local, DEFAULT_USER_SERVER)
    }

    pub fn group(local: impl Into<String>) -> Result<Self, DestinationError> {
        Self::new(local, GROUP_SERVER)
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn is_group(&self) -> bool {
        self.domain == GROUP_SERVER
    }
}

impl FromStr for Destination {
    type Err = DestinationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DestinationError::Empty);
        }

        match s.split_once('@') {
            Some((local, domain)) => Self::new(local, domain),
            None => Self::user(s),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

impl Serialize for Destination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Destination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
