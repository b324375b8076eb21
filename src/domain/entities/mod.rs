//! Domain entities - Core business objects with no external dependencies

pub mod destination;
pub mod issue_event;
pub mod session;

pub use destination::{Destination, DEFAULT_USER_SERVER, GROUP_SERVER};
pub use issue_event::{IssueEvent, ISSUE_CREATED};
pub use session::{EventKind, InboundMessage, PairingMaterial, SessionEvent, SessionState};
