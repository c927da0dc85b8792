//! Parallel, deadline-bounded health check orchestration

use super::types::{DependencyPolicy, ReadinessSnapshot, ServiceCheck};
use crate::config::Config;
use crate::core::breaker::{BreakerStatus, CircuitBreaker, CircuitBreakerConfig};
use crate::core::probe::{DependencyId, Probe, ProbeFailure, ProbeResult, build_probe};
use crate::utils::error::{ReadinessError, Result};
use chrono::Utc;
use futures::FutureExt;
use futures::future::join_all;
use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Timing settings of an orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Deadline for a single probe
    pub probe_timeout: Duration,
    /// Deadline for a whole run; never below `probe_timeout`
    pub overall_budget: Duration,
    /// Freshness window stamped on every snapshot
    pub snapshot_ttl: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            overall_budget: Duration::from_secs(8),
            snapshot_ttl: Duration::from_secs(30),
        }
    }
}

impl OrchestratorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            probe_timeout: config.orchestrator.probe_timeout(),
            overall_budget: config.orchestrator.overall_budget(),
            snapshot_ttl: config.cache.ttl(),
        }
    }
}

#[derive(Debug)]
struct RegisteredDependency {
    id: DependencyId,
    policy: DependencyPolicy,
    probe: Arc<dyn Probe>,
    breaker: Arc<CircuitBreaker>,
}

/// Builder registering the dependencies an orchestrator watches
#[derive(Debug, Default)]
pub struct OrchestratorBuilder {
    settings: OrchestratorSettings,
    breaker_config: CircuitBreakerConfig,
    dependencies: Vec<(DependencyId, DependencyPolicy, Arc<dyn Probe>)>,
}

impl OrchestratorBuilder {
    pub fn settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn breaker_config(mut self, config: CircuitBreakerConfig) -> Self {
        self.breaker_config = config;
        self
    }

    pub fn register(
        mut self,
        id: impl Into<DependencyId>,
        policy: DependencyPolicy,
        probe: Arc<dyn Probe>,
    ) -> Self {
        self.dependencies.push((id.into(), policy, probe));
        self
    }

    /// Build the orchestrator, creating exactly one breaker per dependency
    pub fn build(self) -> Result<HealthCheckOrchestrator> {
        if self.settings.probe_timeout.is_zero() {
            return Err(ReadinessError::validation("probe timeout must be greater than 0"));
        }
        if self.settings.overall_budget < self.settings.probe_timeout {
            return Err(ReadinessError::validation(format!(
                "overall budget {:?} is below the probe timeout {:?}",
                self.settings.overall_budget, self.settings.probe_timeout
            )));
        }

        let mut seen = HashSet::new();
        let mut dependencies = Vec::with_capacity(self.dependencies.len());
        for (id, policy, probe) in self.dependencies {
            if !seen.insert(id.clone()) {
                return Err(ReadinessError::DuplicateDependency(id.to_string()));
            }
            let breaker = Arc::new(CircuitBreaker::new(id.clone(), self.breaker_config.clone()));
            dependencies.push(RegisteredDependency {
                id,
                policy,
                probe,
                breaker,
            });
        }

        let policies = dependencies
            .iter()
            .map(|dep| (dep.id.clone(), dep.policy))
            .collect();

        Ok(HealthCheckOrchestrator {
            settings: self.settings,
            dependencies,
            policies,
        })
    }
}

/// Fans out health probes and merges them into readiness snapshots
#[derive(Debug)]
pub struct HealthCheckOrchestrator {
    settings: OrchestratorSettings,
    dependencies: Vec<RegisteredDependency>,
    policies: BTreeMap<DependencyId, DependencyPolicy>,
}

impl HealthCheckOrchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Build an orchestrator with HTTP / JSON-RPC probes from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("readiness-orchestrator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut builder = Self::builder()
            .settings(OrchestratorSettings::from_config(config))
            .breaker_config(CircuitBreakerConfig::from(&config.circuit_breaker));
        for dependency in &config.dependencies {
            let probe = build_probe(dependency, &client)?;
            info!(
                "Registering dependency {} ({:?}) at {}",
                dependency.id,
                dependency.policy,
                dependency.probe.url()
            );
            builder = builder.register(dependency.id.as_str(), dependency.policy, probe);
        }
        builder.build()
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Registered dependencies and their policies
    pub fn policies(&self) -> &BTreeMap<DependencyId, DependencyPolicy> {
        &self.policies
    }

    pub fn breaker(&self, id: &DependencyId) -> Option<&Arc<CircuitBreaker>> {
        self.dependencies
            .iter()
            .find(|dep| &dep.id == id)
            .map(|dep| &dep.breaker)
    }

    pub fn breaker_statuses(&self) -> Vec<BreakerStatus> {
        self.dependencies.iter().map(|dep| dep.breaker.status()).collect()
    }

    /// Probe every registered dependency once and build a snapshot.
    ///
    /// Never fails: probe errors, timeouts and open breakers are all recorded
    /// as data. Completes within the overall budget.
    pub async fn run(&self) -> ReadinessSnapshot {
        let started = Instant::now();
        let run_deadline = started + self.settings.overall_budget;

        let checks = join_all(
            self.dependencies
                .iter()
                .map(|dep| self.check(dep, run_deadline)),
        )
        .await;

        let services = checks
            .into_iter()
            .map(|check| (check.dependency().clone(), check))
            .collect();
        let snapshot = ReadinessSnapshot::new(services, &self.policies, self.settings.snapshot_ttl);

        info!(
            "Readiness run finished: ready={}, healthy={}/{}, elapsed={}ms",
            snapshot.system_ready,
            snapshot.healthy_count(),
            snapshot.services.len(),
            started.elapsed().as_millis()
        );
        snapshot
    }

    /// Snapshot in which every dependency failed; used when no run could complete
    pub fn degraded_snapshot(&self, failure: ProbeFailure) -> ReadinessSnapshot {
        ReadinessSnapshot::degraded(&self.policies, failure)
    }

    async fn check(&self, dep: &RegisteredDependency, run_deadline: Instant) -> ServiceCheck {
        let Some(permit) = dep.breaker.should_probe() else {
            dep.breaker.record_skipped();
            debug!("Skipping probe for {}: circuit open", dep.id);
            return ServiceCheck::SkippedBecauseOpen {
                dependency: dep.id.clone(),
                observed_at: Utc::now(),
            };
        };

        let started = Instant::now();
        let deadline = (started + self.settings.probe_timeout).min(run_deadline);

        // On expiry the probe future is dropped, abandoning the call.
        // A panicking probe fails its own dependency only.
        let call = AssertUnwindSafe(async { dep.probe.probe(deadline).await }).catch_unwind();
        let outcome = tokio::time::timeout_at(deadline, call).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(Ok(Ok(()))) => ProbeResult::healthy(dep.id.clone(), latency_ms),
            Ok(Ok(Err(failure))) => ProbeResult::failed(dep.id.clone(), latency_ms, failure),
            Ok(Err(payload)) => {
                let message = panic_message(payload.as_ref());
                warn!("Probe for {} panicked: {}", dep.id, message);
                ProbeResult::failed(
                    dep.id.clone(),
                    latency_ms,
                    ProbeFailure::unknown(format!("probe panicked: {}", message)),
                )
            }
            Err(_) => ProbeResult::failed(
                dep.id.clone(),
                latency_ms,
                ProbeFailure::timeout(format!("no answer within {}ms", latency_ms)),
            ),
        };
        debug!(
            "Probe for {} finished: success={}, latency={}ms, error={:?}",
            dep.id, result.success, result.latency_ms, result.error_kind
        );

        dep.breaker.record(permit, &result);
        ServiceCheck::Probed(result)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
