//! Event handler registry - one active handler per event kind

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::EventKind;
use crate::domain::traits::EventHandler;

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<EventKind, Arc<dyn EventHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` for `kind`, returning the handler it replaced
    pub fn register(&mut self, kind: EventKind, handler: Arc<dyn EventHandler>) -> Option<Arc<dyn EventHandler>> {
        self.handlers.insert(kind, handler)
    }

    pub fn get(&self, kind: EventKind) -> Option<Arc<dyn EventHandler>> {
        self.handlers.get(&kind).cloned()
    }
}
