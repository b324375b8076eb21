//! Test doubles shared by unit tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::{SendError, StorageError, TransportError};
use crate::domain::entities::Destination;
use crate::domain::traits::{DestinationStore, MessageSender, SessionTransport, TransportEvent};

/// Transport driven by the test through an unbounded channel
pub struct ScriptedTransport {
    script: Mutex<Option<mpsc::UnboundedReceiver<TransportEvent>>>,
    sent: Mutex<Vec<(Destination, String)>>,
    fail_sends: AtomicBool,
}

impl ScriptedTransport {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<TransportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Self {
            script: Mutex::new(Some(rx)),
            sent: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
        };
        (Arc::new(transport), tx)
    }

    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(Destination, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionTransport for ScriptedTransport {
    async fn connect(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), TransportError> {
        let mut script = self.script.lock().unwrap().take().ok_or(TransportError::Closed)?;
        while let Some(event) = script.recv().await {
            events.send(event).await.map_err(|_| TransportError::Closed)?;
        }
        Ok(())
    }

    async fn send_text(&self, to: &Destination, text: &str) -> Result<(), TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Network("connection reset".into()));
        }
        self.sent.lock().unwrap().push((to.clone(), text.to_string()));
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Sender that records every message
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(Destination, String)>>,
    disconnected: AtomicBool,
}

impl RecordingSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn disconnected() -> Arc<Self> {
        let sender = Self::default();
        sender.disconnected.store(true, Ordering::SeqCst);
        Arc::new(sender)
    }

    pub fn sent(&self) -> Vec<(Destination, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, to: &Destination, text: &str) -> Result<(), SendError> {
        if self.disconnected.load(Ordering::SeqCst) {
            return Err(SendError::NotConnected);
        }
        self.sent.lock().unwrap().push((to.clone(), text.to_string()));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.disconnected.load(Ordering::SeqCst)
    }
}

/// In-memory store, optionally failing every write
#[derive(Default)]
pub struct MemoryStore {
    value: Mutex<Option<Destination>>,
    fail_writes: bool,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with(destination: Destination) -> Arc<Self> {
        Arc::new(Self {
            value: Mutex::new(Some(destination)),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_writes: true,
            ..Self::default()
        })
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl DestinationStore for MemoryStore {
    async fn read(&self) -> Option<Destination> {
        self.value.lock().unwrap().clone()
    }

    async fn write(&self, destination: &Destination) -> Result<(), StorageError> {
        *self.writes.lock().unwrap() += 1;
        if self.fail_writes {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only file system",
            )));
        }
        *self.value.lock().unwrap() = Some(destination.clone());
        Ok(())
    }
}

/// Poll `condition` until it holds or a second has passed
pub async fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
