//! Circuit breaker state and configuration types

use crate::config::BreakerConfig;
use crate::core::probe::DependencyId;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Probes flow normally
    Closed,
    /// Probes are skipped
    Open,
    /// Limited trial probes are allowed
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        };
        f.write_str(name)
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Consecutive half-open successes that close the circuit
    pub success_threshold: u32,
    /// How long the circuit stays open before trial probes
    pub open_timeout: Duration,
    /// Trial probes allowed at once while half-open
    pub half_open_max_concurrent: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            success_threshold: 1,
            open_timeout: Duration::from_secs(30),
            half_open_max_concurrent: 1,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }

    pub fn with_half_open_max_concurrent(mut self, max: u32) -> Self {
        self.half_open_max_concurrent = max;
        self
    }
}

impl From<&BreakerConfig> for CircuitBreakerConfig {
    fn from(config: &BreakerConfig) -> Self {
        Self {
            failure_threshold: config.failure_threshold,
            success_threshold: config.success_threshold,
            open_timeout: Duration::from_millis(config.open_timeout_ms),
            half_open_max_concurrent: config.half_open_max_concurrent,
        }
    }
}

/// Failure history of one dependency
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerRecord {
    pub dependency: DependencyId,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub opened_at: Option<Instant>,
}

impl BreakerRecord {
    pub(super) fn new(dependency: DependencyId) -> Self {
        Self {
            dependency,
            state: CircuitState::Closed,
            consecutive_failures: 0,
            consecutive_successes: 0,
            opened_at: None,
        }
    }
}

/// Serializable view of a breaker for observability endpoints
#[derive(Debug, Clone, Serialize)]
pub struct BreakerStatus {
    pub dependency: DependencyId,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    /// Remaining open time in ms, if currently open
    pub open_remaining_ms: Option<u64>,
    pub half_open_in_flight: u32,
    pub probes_total: u64,
    pub skipped_total: u64,
}
