use async_trait::async_trait;

use crate::domain::entities::SessionEvent;

/// Subscriber for session events
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: SessionEvent);
}
