//! Per-dependency circuit breakers
//!
//! Each dependency owns exactly one [`CircuitBreaker`]. A breaker decides
//! whether a probe may be attempted at all:
//!
//! - **Closed**: probes pass; consecutive failures are counted
//! - **Open**: probes are skipped until the open timeout elapses
//! - **Half-Open**: a limited number of trial probes detect recovery
//!
//! The `Open -> HalfOpen` transition is lazy: it happens on the first
//! [`CircuitBreaker::should_probe`] call after the timeout, so breakers need
//! no scheduler of their own.
//!
//! ```rust
//! use readiness_orchestrator::core::breaker::{CircuitBreaker, CircuitBreakerConfig};
//! use readiness_orchestrator::core::probe::{DependencyId, ProbeResult};
//! use std::time::Duration;
//!
//! let config = CircuitBreakerConfig::new()
//!     .with_failure_threshold(3)
//!     .with_open_timeout(Duration::from_secs(30));
//! let breaker = CircuitBreaker::new(DependencyId::new("core"), config);
//!
//! if let Some(permit) = breaker.should_probe() {
//!     let result = ProbeResult::healthy(DependencyId::new("core"), 4);
//!     breaker.record(permit, &result);
//! }
//! ```

mod circuit_breaker;
mod types;

pub use circuit_breaker::{CircuitBreaker, ProbePermit};
pub use types::{BreakerRecord, BreakerStatus, CircuitBreakerConfig, CircuitState};
