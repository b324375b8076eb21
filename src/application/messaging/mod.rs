//! Message handling - Event-driven command processing

pub mod commands;
pub mod dispatcher;
pub mod parser;

pub use commands::CommandHandler;
pub use dispatcher::EventDispatcher;
pub use parser::{ChatCommand, MessageParser};
