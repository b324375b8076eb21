//! Domain traits - Abstractions for infrastructure implementations

pub mod handler;
pub mod sender;
pub mod store;
pub mod transport;

pub use handler::EventHandler;
pub use sender::MessageSender;
pub use store::DestinationStore;
pub use transport::{SessionTransport, TransportEvent};
