//! Configuration data models
//!
//! This module defines the configuration sections read from the YAML file.

pub mod alerts;
pub mod breaker;
pub mod cache;
pub mod dependency;
pub mod logging;
pub mod monitoring;
pub mod orchestrator;
pub mod server;

// Re-export all configuration types
pub use alerts::*;
pub use breaker::*;
pub use cache::*;
pub use dependency::*;
pub use logging::*;
pub use monitoring::*;
pub use orchestrator::*;
pub use server::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8080
}

pub(crate) fn default_true() -> bool {
    true
}
