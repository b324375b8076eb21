//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Session: Messaging session lifecycle and event fan-out
//! - Services: Destination resolution, formatting, webhook relay
//! - Messaging: Chat command parsing and dispatching
//! - Errors: Domain-specific errors

pub mod errors;
pub mod messaging;
pub mod services;
pub mod session;
