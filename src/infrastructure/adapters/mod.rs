//! Session transport adapters

pub mod bridge;
pub mod console;

pub use bridge::BridgeTransport;
pub use console::ConsoleTransport;
