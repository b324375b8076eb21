//! Jira to WhatsApp notification relay

pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod test_support;
