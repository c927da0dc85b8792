//! Background monitor configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Background monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Run the background monitor
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval between proactive refreshes, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// How long shutdown waits for an in-flight run, in milliseconds
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: default_interval_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

fn default_interval_ms() -> u64 {
    15_000
}

fn default_shutdown_grace_ms() -> u64 {
    5_000
}
