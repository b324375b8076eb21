use async_trait::async_trait;

use crate::application::errors::StorageError;
use crate::domain::entities::Destination;

/// DestinationStore trait - single-value persistence of the active destination
#[async_trait]
pub trait DestinationStore: Send + Sync {
    /// Last written destination. Unreadable state reads as `None`.
    async fn read(&self) -> Option<Destination>;

    /// Replace the stored destination atomically
    async fn write(&self, destination: &Destination) -> Result<(), StorageError>;
}
