//! Chat command handler - `/group` moves notifications to the current chat

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::entities::{Destination, InboundMessage};
use crate::domain::traits::{DestinationStore, MessageSender};

use super::parser::{ChatCommand, MessageParser};

pub fn deactivation_notice() -> String {
    "⚠️ *Notificaciones Desactivadas*\n\n\
Las notificaciones de Jira se han movido a otro chat por instrucción del usuario."
        .to_string()
}

pub fn confirmation_notice(chat: &Destination) -> String {
    format!(
        "✅ *¡Configurado!*\n\n\
Este chat ({}) ha sido establecido como el destino para las notificaciones de Jira.",
        chat
    )
}

pub fn failure_notice(reason: &str) -> String {
    format!("❌ Error al guardar configuración: {}", reason)
}

pub struct CommandHandler {
    store: Arc<dyn DestinationStore>,
    sender: Arc<dyn MessageSender>,
    /// Serializes read-old/write-new across concurrent `/group` commands; never held across a send
    switch_lock: Mutex<()>,
}

impl CommandHandler {
    pub fn new(store: Arc<dyn DestinationStore>, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            store,
            sender,
            switch_lock: Mutex::new(()),
        }
    }

    /// Handle an inbound message. Never fails: errors end up in logs or chat.
    pub async fn handle(&self, message: &InboundMessage) {
        if message.is_from_me {
            return;
        }

        if let Some(ChatCommand::Group) = MessageParser::parse(message) {
            match &message.sender {
                Some(sender) => tracing::info!("/group received in {} from {}", message.chat, sender),
                None => tracing::info!("/group received in {}", message.chat),
            }
            self.activate(&message.chat).await;
        }
    }

    async fn activate(&self, chat: &Destination) {
        let (previous, written) = {
            let _guard = self.switch_lock.lock().await;
            let previous = self.store.read().await;
            (previous, self.store.write(chat).await)
        };

        match written {
            Ok(()) => {
                tracing::info!("Active destination set to {}", chat);
                if let Some(old) = previous.filter(|old| old != chat) {
                    tracing::info!("Moved notifications from {} to {}", old, chat);
                    self.notify(&old, &deactivation_notice()).await;
                }
                self.notify(chat, &confirmation_notice(chat)).await;
            }
            Err(e) => {
                tracing::error!("Failed to save destination {}: {}", chat, e);
                self.notify(chat, &failure_notice(&e.to_string())).await;
            }
        }
    }

    /// Best-effort send
    async fn notify(&self, to: &Destination, text: &str) {
        if let Err(e) = self.sender.send(to, text).await {
            tracing::warn!("Could not notify {}: {}", to, e);
        }
    }
}
