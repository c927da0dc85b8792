//! Circuit breaker configuration

use serde::{Deserialize, Serialize};

/// Circuit breaker thresholds, shared by every dependency's breaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures that open a closed breaker
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Consecutive half-open successes that close the breaker
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
    /// How long an open breaker blocks probes, in milliseconds
    #[serde(default = "default_open_timeout_ms")]
    pub open_timeout_ms: u64,
    /// Probes allowed through at once while half-open
    #[serde(default = "default_half_open_max_concurrent")]
    pub half_open_max_concurrent: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            success_threshold: default_success_threshold(),
            open_timeout_ms: default_open_timeout_ms(),
            half_open_max_concurrent: default_half_open_max_concurrent(),
        }
    }
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_success_threshold() -> u32 {
    1
}

fn default_open_timeout_ms() -> u64 {
    30_000
}

fn default_half_open_max_concurrent() -> u32 {
    1
}
