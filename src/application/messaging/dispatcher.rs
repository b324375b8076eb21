//! Event dispatcher - Routes session events to their handlers

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::session::SessionManager;
use crate::domain::entities::{Destination, EventKind, SessionEvent};
use crate::domain::traits::{EventHandler, MessageSender};

use super::commands::CommandHandler;

pub fn welcome_message() -> String {
    "👋 ¡Hola! Soy el bot de Jira.\n\n\
Para recibir notificaciones aquí, envía el comando: */group*\n\n\
De lo contrario, seguiré usando la configuración por defecto."
        .to_string()
}

/// Session event dispatcher
pub struct EventDispatcher {
    commands: CommandHandler,
    sender: Arc<dyn MessageSender>,
}

impl EventDispatcher {
    pub fn new(commands: CommandHandler, sender: Arc<dyn MessageSender>) -> Self {
        Self { commands, sender }
    }

    /// Subscribe to every event kind this dispatcher handles
    pub fn register(self: &Arc<Self>, session: &SessionManager) {
        for kind in [EventKind::Connected, EventKind::GroupJoined, EventKind::MessageReceived] {
            session.subscribe(kind, Arc::clone(self) as Arc<dyn EventHandler>);
        }
    }

    /// Greets the group; activation still requires `/group`
    async fn on_group_joined(&self, group: &Destination) {
        tracing::info!("Added to group {}", group);
        if let Err(e) = self.sender.send(group, &welcome_message()).await {
            tracing::warn!("Could not greet {}: {}", group, e);
        }
    }
}

#[async_trait]
impl EventHandler for EventDispatcher {
    async fn handle(&self, event: SessionEvent) {
        match event {
            SessionEvent::Connected => tracing::info!("Bot connected and ready for commands"),
            SessionEvent::GroupJoined(group) => self.on_group_joined(&group).await,
            SessionEvent::MessageReceived(message) => self.commands.handle(&message).await,
        }
    }
}
