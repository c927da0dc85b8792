//! Circuit breaker implementation

use super::types::{BreakerRecord, BreakerStatus, CircuitBreakerConfig, CircuitState};
use crate::core::probe::{DependencyId, ProbeResult};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct BreakerInner {
    record: BreakerRecord,
    half_open_in_flight: u32,
    /// Bumped on every entry into half-open so stale permits cannot free new slots
    half_open_generation: u64,
    probes_total: u64,
    skipped_total: u64,
}

impl BreakerInner {
    fn open(&mut self, now: Instant) {
        self.record.state = CircuitState::Open;
        self.record.opened_at = Some(now);
        self.record.consecutive_successes = 0;
        self.half_open_in_flight = 0;
    }

    fn enter_half_open(&mut self) {
        self.record.state = CircuitState::HalfOpen;
        self.record.consecutive_successes = 0;
        self.half_open_generation += 1;
        self.half_open_in_flight = 0;
    }

    fn close(&mut self) {
        self.record.state = CircuitState::Closed;
        self.record.consecutive_failures = 0;
        self.record.consecutive_successes = 0;
        self.record.opened_at = None;
        self.half_open_in_flight = 0;
    }

    fn release_slot(&mut self, generation: u64) {
        if self.record.state == CircuitState::HalfOpen && self.half_open_generation == generation {
            self.half_open_in_flight = self.half_open_in_flight.saturating_sub(1);
        }
    }
}

/// Permission to run one probe.
///
/// While half-open a permit occupies one of the limited trial slots; the slot
/// is freed when the permit is recorded or dropped (e.g. an abandoned probe).
pub struct ProbePermit {
    inner: Arc<Mutex<BreakerInner>>,
    half_open_generation: Option<u64>,
}

impl ProbePermit {
    /// Whether this permit is a half-open trial
    pub fn is_trial(&self) -> bool {
        self.half_open_generation.is_some()
    }
}

impl fmt::Debug for ProbePermit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbePermit")
            .field("half_open_generation", &self.half_open_generation)
            .finish()
    }
}

impl Drop for ProbePermit {
    fn drop(&mut self) {
        if let Some(generation) = self.half_open_generation.take() {
            self.inner.lock().release_slot(generation);
        }
    }
}

/// Circuit breaker guarding probes for a single dependency
pub struct CircuitBreaker {
    dependency: DependencyId,
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<BreakerInner>>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker in the closed state
    pub fn new(dependency: DependencyId, config: CircuitBreakerConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BreakerInner {
                record: BreakerRecord::new(dependency.clone()),
                half_open_in_flight: 0,
                half_open_generation: 0,
                probes_total: 0,
                skipped_total: 0,
            })),
            dependency,
            config,
        }
    }

    pub fn dependency(&self) -> &DependencyId {
        &self.dependency
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Decide whether a probe may run now.
    ///
    /// Returns `None` while open, or while half-open with every trial slot taken.
    /// An open breaker whose timeout has elapsed moves to half-open here.
    pub fn should_probe(&self) -> Option<ProbePermit> {
        let mut inner = self.inner.lock();

        match inner.record.state {
            CircuitState::Closed => {
                return Some(ProbePermit {
                    inner: self.inner.clone(),
                    half_open_generation: None,
                });
            }
            CircuitState::Open => {
                let expired = inner
                    .record
                    .opened_at
                    .is_none_or(|opened| opened.elapsed() >= self.config.open_timeout);
                if !expired {
                    return None;
                }
                debug!(
                    "Circuit breaker for {} transitioning from Open to HalfOpen",
                    self.dependency
                );
                inner.enter_half_open();
            }
            CircuitState::HalfOpen => {}
        }

        if inner.half_open_in_flight >= self.config.half_open_max_concurrent {
            return None;
        }
        inner.half_open_in_flight += 1;
        Some(ProbePermit {
            inner: self.inner.clone(),
            half_open_generation: Some(inner.half_open_generation),
        })
    }

    /// Record the result of a probe that was allowed through
    pub fn record(&self, mut permit: ProbePermit, result: &ProbeResult) {
        let slot = permit.half_open_generation.take();
        let mut inner = self.inner.lock();
        if let Some(generation) = slot {
            inner.release_slot(generation);
        }
        inner.probes_total += 1;

        match inner.record.state {
            CircuitState::Closed => {
                if result.success {
                    inner.record.consecutive_failures = 0;
                } else {
                    inner.record.consecutive_failures =
                        inner.record.consecutive_failures.saturating_add(1);
                    if inner.record.consecutive_failures >= self.config.failure_threshold {
                        warn!(
                            "Circuit breaker for {} opening after {} consecutive failures",
                            self.dependency, inner.record.consecutive_failures
                        );
                        inner.open(Instant::now());
                    }
                }
            }
            CircuitState::HalfOpen => {
                if result.success {
                    inner.record.consecutive_successes += 1;
                    if inner.record.consecutive_successes >= self.config.success_threshold {
                        info!(
                            "Circuit breaker for {} closing after {} successful trial probes",
                            self.dependency, inner.record.consecutive_successes
                        );
                        inner.close();
                    }
                } else {
                    inner.record.consecutive_failures =
                        inner.record.consecutive_failures.saturating_add(1);
                    warn!(
                        "Circuit breaker for {} reopening after failed trial probe",
                        self.dependency
                    );
                    inner.open(Instant::now());
                }
            }
            CircuitState::Open => {
                // A result from an earlier period; the open timer must not move.
                debug!(
                    "Ignoring late probe result for {} while circuit is open",
                    self.dependency
                );
            }
        }
    }

    /// Record that a probe was skipped. Never changes state.
    pub fn record_skipped(&self) {
        self.inner.lock().skipped_total += 1;
    }

    /// Current state
    pub fn state(&self) -> CircuitState {
        self.inner.lock().record.state
    }

    /// Copy of the breaker record
    pub fn snapshot(&self) -> BreakerRecord {
        self.inner.lock().record.clone()
    }

    /// Serializable status
    pub fn status(&self) -> BreakerStatus {
        let inner = self.inner.lock();
        let open_remaining_ms = match (inner.record.state, inner.record.opened_at) {
            (CircuitState::Open, Some(opened)) => Some(
                self.config
                    .open_timeout
                    .saturating_sub(opened.elapsed())
                    .as_millis() as u64,
            ),
            _ => None,
        };
        BreakerStatus {
            dependency: self.dependency.clone(),
            state: inner.record.state,
            consecutive_failures: inner.record.consecutive_failures,
            consecutive_successes: inner.record.consecutive_successes,
            open_remaining_ms,
            half_open_in_flight: inner.half_open_in_flight,
            probes_total: inner.probes_total,
            skipped_total: inner.skipped_total,
        }
    }

    /// Force the breaker back to closed
    pub fn reset(&self) {
        self.inner.lock().close();
        debug!("Circuit breaker for {} reset", self.dependency);
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("dependency", &self.dependency)
            .field("state", &self.state())
            .finish()
    }
}
