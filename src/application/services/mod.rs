//! Application services - Business logic orchestration

pub mod formatter;
pub mod notification_service;
pub mod resolver;

pub use formatter::NotificationFormatter;
pub use notification_service::{Delivery, NotificationService, DEFAULT_TEST_MESSAGE};
pub use resolver::{resolve, DestinationResolver};
