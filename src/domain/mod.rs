//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (Destination, IssueEvent, session events)
//! - Traits: Abstractions for infrastructure (SessionTransport, DestinationStore, MessageSender)

pub mod entities;
pub mod traits;
