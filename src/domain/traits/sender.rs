use async_trait::async_trait;

use crate::application::errors::SendError;
use crate::domain::entities::Destination;

/// Anything that can deliver a text message to a destination
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, to: &Destination, text: &str) -> Result<(), SendError>;

    /// Whether a send right now has a chance of succeeding
    fn is_connected(&self) -> bool;
}
