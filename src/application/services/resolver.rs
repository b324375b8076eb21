use std::sync::Arc;

use crate::domain::entities::Destination;
use crate::domain::traits::DestinationStore;

/// Pick the delivery target: stored override, else static fallback
pub fn resolve(stored: Option<Destination>, fallback: Option<&Destination>) -> Option<Destination> {
    stored.or_else(|| fallback.cloned())
}

/// Resolves the active destination from the store and configuration
#[derive(Clone)]
pub struct DestinationResolver {
    store: Arc<dyn DestinationStore>,
    fallback: Option<Destination>,
}

impl DestinationResolver {
    pub fn new(store: Arc<dyn DestinationStore>, fallback: Option<Destination>) -> Self {
        Self { store, fallback }
    }

    pub async fn resolve(&self) -> Option<Destination> {
        let stored = self.store.read().await;
        match (&stored, &self.fallback) {
            (Some(dest), _) => tracing::debug!("Using dynamic destination {}", dest),
            (None, Some(dest)) => tracing::debug!("Using static destination {}", dest),
            (None, None) => tracing::debug!("No destination configured"),
        }
        resolve(stored, self.fallback.as_ref())
    }
}
