//! Alerting configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Where transition alerts are delivered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Log every transition through tracing
    #[serde(default = "default_true")]
    pub log: bool,
    /// Optional webhook receiving each transition as JSON
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Capacity of the in-process broadcast channel
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            log: true,
            webhook_url: None,
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

fn default_broadcast_capacity() -> usize {
    256
}
