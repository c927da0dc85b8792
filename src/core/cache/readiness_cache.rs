//! TTL cache with single-flight refresh

use crate::core::health::{HealthCheckOrchestrator, ReadinessSnapshot};
use crate::core::probe::ProbeFailure;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error};

type SharedRefresh = Shared<BoxFuture<'static, Arc<ReadinessSnapshot>>>;

/// Upper bound for the freshness window when `now + ttl` overflows
const MAX_FRESHNESS: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

#[derive(Debug)]
struct CacheEntry {
    snapshot: Arc<ReadinessSnapshot>,
    fresh_until: Instant,
}

#[derive(Default)]
struct CacheState {
    entry: Option<CacheEntry>,
    in_flight: Option<SharedRefresh>,
}

/// Holds the latest readiness snapshot and refreshes it on demand.
///
/// At most one orchestrator run is in flight at a time. Callers arriving
/// during a refresh await the same result instead of starting their own.
pub struct ReadinessCache {
    orchestrator: Arc<HealthCheckOrchestrator>,
    ttl: Duration,
    state: Arc<Mutex<CacheState>>,
    refreshes: Arc<AtomicU64>,
}

impl std::fmt::Debug for ReadinessCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ReadinessCache")
            .field("ttl", &self.ttl)
            .field("cached", &state.entry.is_some())
            .field("refreshing", &state.in_flight.is_some())
            .field("refreshes", &self.refresh_count())
            .finish()
    }
}

impl ReadinessCache {
    pub fn new(orchestrator: Arc<HealthCheckOrchestrator>, ttl: Duration) -> Self {
        Self {
            orchestrator,
            ttl,
            state: Arc::new(Mutex::new(CacheState::default())),
            refreshes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn orchestrator(&self) -> &Arc<HealthCheckOrchestrator> {
        &self.orchestrator
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached snapshot while fresh, otherwise join or start a refresh
    pub async fn get(&self) -> Arc<ReadinessSnapshot> {
        let pending = {
            let mut state = self.state.lock();
            if let Some(entry) = &state.entry {
                if Instant::now() < entry.fresh_until {
                    return Arc::clone(&entry.snapshot);
                }
            }
            self.join_or_start(&mut state)
        };
        pending.await
    }

    /// Produce a new snapshot regardless of freshness.
    ///
    /// Joins a refresh that is already running rather than starting a second one.
    pub async fn refresh(&self) -> Arc<ReadinessSnapshot> {
        let pending = {
            let mut state = self.state.lock();
            self.join_or_start(&mut state)
        };
        pending.await
    }

    /// Stored snapshot, fresh or not, without triggering any work
    pub fn peek(&self) -> Option<Arc<ReadinessSnapshot>> {
        self.state
            .lock()
            .entry
            .as_ref()
            .map(|entry| Arc::clone(&entry.snapshot))
    }

    /// Number of orchestrator runs started by this cache
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    fn join_or_start(&self, state: &mut CacheState) -> SharedRefresh {
        if let Some(in_flight) = &state.in_flight {
            debug!("Joining in-flight readiness refresh");
            return in_flight.clone();
        }

        // Spawned so that a cancelled caller never cancels the run itself.
        let task = {
            let orchestrator = Arc::clone(&self.orchestrator);
            let state = Arc::clone(&self.state);
            let refreshes = Arc::clone(&self.refreshes);
            let ttl = self.ttl;
            tokio::spawn(async move {
                refreshes.fetch_add(1, Ordering::Relaxed);
                let snapshot = Arc::new(orchestrator.run().await);

                // Never fresh past the snapshot's own expires_at.
                let now = Instant::now();
                let window = ttl.min(snapshot.time_to_live());
                let fresh_until = now
                    .checked_add(window)
                    .unwrap_or_else(|| now + MAX_FRESHNESS);
                let mut state = state.lock();
                state.entry = Some(CacheEntry {
                    snapshot: Arc::clone(&snapshot),
                    fresh_until,
                });
                state.in_flight = None;
                snapshot
            })
        };

        let orchestrator = Arc::clone(&self.orchestrator);
        let fallback_state = Arc::clone(&self.state);
        let refresh = async move {
            match task.await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    error!("Readiness refresh task failed: {}", e);
                    let mut state = fallback_state.lock();
                    state.in_flight = None;
                    match &state.entry {
                        Some(entry) => Arc::clone(&entry.snapshot),
                        None => Arc::new(orchestrator.degraded_snapshot(ProbeFailure::unknown(
                            format!("readiness refresh failed: {}", e),
                        ))),
                    }
                }
            }
        }
        .boxed()
        .shared();

        state.in_flight = Some(refresh.clone());
        refresh
    }
}
