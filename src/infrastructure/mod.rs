//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: YAML + environment configuration
//! - Storage: Active destination persistence
//! - Adapters: Session transports (bridge, console)
//! - Http: Webhook and status endpoints

pub mod adapters;
pub mod config;
pub mod http;
pub mod storage;
