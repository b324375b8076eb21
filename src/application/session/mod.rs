//! Session manager - owns the messaging session lifecycle
//!
//! State machine: Disconnected --start--> Pairing --handshake ok--> Connected,
//! and any state --> Disconnected when the transport stops. The first
//! Connected opens a readiness latch that never closes again.

pub mod registry;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::application::errors::SendError;
use crate::domain::entities::{Destination, EventKind, PairingMaterial, SessionEvent, SessionState};
use crate::domain::traits::{EventHandler, MessageSender, SessionTransport, TransportEvent};

pub use registry::HandlerRegistry;

/// Default bounded wait for the first Connected in `start`
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

const EVENT_BUFFER: usize = 64;

pub struct SessionManager {
    transport: Arc<dyn SessionTransport>,
    state: RwLock<SessionState>,
    pairing: RwLock<Option<PairingMaterial>>,
    ready: watch::Sender<bool>,
    handlers: RwLock<HandlerRegistry>,
    started: AtomicBool,
    stopped: AtomicBool,
    connection: Mutex<Option<JoinHandle<()>>>,
    connect_timeout: Duration,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn SessionTransport>) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            transport,
            state: RwLock::new(SessionState::Disconnected),
            pairing: RwLock::new(None),
            ready,
            handlers: RwLock::new(HandlerRegistry::new()),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            connection: Mutex::new(None),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Begin the handshake and wait (bounded) for the first Connected.
    ///
    /// Returns whether the session became ready in time. On timeout the
    /// handshake keeps running in the background. Only the first call
    /// spawns the connection; later calls just wait.
    pub async fn start(self: &Arc<Self>) -> bool {
        if !self.started.swap(true, Ordering::SeqCst) {
            self.spawn_connection();
        }

        let ready = self.wait_until_ready(self.connect_timeout).await;
        if !ready {
            tracing::warn!(
                "Session not connected after {}s (state: {}), continuing in degraded mode",
                self.connect_timeout.as_secs(),
                self.state()
            );
        }
        ready
    }

    fn spawn_connection(self: &Arc<Self>) {
        tracing::info!("Starting {} session", self.transport.name());
        self.set_state(SessionState::Pairing);

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let transport = Arc::clone(&self.transport);
        let connection = tokio::spawn(async move {
            match transport.connect(tx).await {
                Ok(()) => tracing::info!("{} session ended", transport.name()),
                Err(e) => tracing::error!("{} session failed: {}", transport.name(), e),
            }
        });
        *self.connection.lock().unwrap_or_else(PoisonError::into_inner) = Some(connection);

        tokio::spawn(Arc::clone(self).pump(rx));
    }

    /// Stop the session; the state drops to Disconnected and stays there
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let connection = self.connection.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(connection) = connection {
            connection.abort();
        }
        self.mark_disconnected("stopped");
    }

    /// Wait for the readiness latch; returns immediately once it is open
    pub async fn wait_until_ready(&self, timeout: Duration) -> bool {
        let mut ready = self.ready.subscribe();
        let opened = matches!(
            tokio::time::timeout(timeout, ready.wait_for(|is_ready| *is_ready)).await,
            Ok(Ok(_))
        );
        opened
    }

    pub fn state(&self) -> SessionState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    /// True once the first Connected has been observed
    pub fn has_been_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub fn current_pairing_material(&self) -> Option<PairingMaterial> {
        self.pairing.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Install the handler for `kind`, replacing any previous one
    pub fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        let replaced = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(kind, handler);
        if replaced.is_some() {
            tracing::debug!("Replaced {:?} handler", kind);
        }
    }

    /// Send a text message through the transport. Never retries.
    pub async fn send(&self, to: &Destination, text: &str) -> Result<(), SendError> {
        if !self.is_connected() {
            tracing::error!("Cannot send to {}: session is {}", to, self.state());
            return Err(SendError::NotConnected);
        }

        match self.transport.send_text(to, text).await {
            Ok(()) => {
                tracing::info!("Message sent to {}", to);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to send message to {}: {}", to, e);
                Err(SendError::Transport(e.to_string()))
            }
        }
    }

    async fn pump(self: Arc<Self>, mut events: mpsc::Receiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            if self.stopped.load(Ordering::SeqCst) {
                tracing::debug!("Dropping {:?} after stop", event);
                break;
            }
            if let Some(event) = self.apply(event) {
                self.dispatch(event);
            }
        }
        self.mark_disconnected("transport closed");
    }

    /// Apply a transport event to the state machine
    fn apply(&self, event: TransportEvent) -> Option<SessionEvent> {
        match event {
            TransportEvent::PairingCode(code) => {
                if self.set_state(SessionState::Pairing) {
                    *self.pairing.write().unwrap_or_else(PoisonError::into_inner) = Some(PairingMaterial::new(code));
                    tracing::info!("Pairing code received, scan it from GET /qr");
                }
                None
            }
            TransportEvent::Connected => {
                *self.pairing.write().unwrap_or_else(PoisonError::into_inner) = None;
                if !self.set_state(SessionState::Connected) {
                    return None;
                }
                self.ready.send_replace(true);
                tracing::info!("Session connected");
                Some(SessionEvent::Connected)
            }
            TransportEvent::Disconnected { reason } => {
                self.mark_disconnected(&reason);
                None
            }
            TransportEvent::GroupJoined(group) => Some(SessionEvent::GroupJoined(group)),
            TransportEvent::Message(message) => Some(SessionEvent::MessageReceived(message)),
        }
    }

    /// Run the subscribed handler on its own task so the pump never blocks
    fn dispatch(&self, event: SessionEvent) {
        let kind = event.kind();
        let handler = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(kind);

        match handler {
            Some(handler) => {
                tokio::spawn(async move { handler.handle(event).await });
            }
            None => tracing::debug!("No handler for {:?}", kind),
        }
    }

    /// Returns false when a stopped session refuses to leave Disconnected
    fn set_state(&self, state: SessionState) -> bool {
        let mut current = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if self.stopped.load(Ordering::SeqCst) && state != SessionState::Disconnected {
            return false;
        }
        *current = state;
        true
    }

    fn mark_disconnected(&self, reason: &str) {
        let previous = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *state, SessionState::Disconnected)
        };
        *self.pairing.write().unwrap_or_else(PoisonError::into_inner) = None;
        if previous != SessionState::Disconnected {
            tracing::warn!("Session disconnected ({}): {}", previous, reason);
        }
    }
}

#[async_trait]
impl MessageSender for SessionManager {
    async fn send(&self, to: &Destination, text: &str) -> Result<(), SendError> {
        SessionManager::send(self, to, text).await
    }

    fn is_connected(&self) -> bool {
        SessionManager::is_connected(self)
    }
}
