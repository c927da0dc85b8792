//! Readiness snapshot types

use crate::core::probe::{DependencyId, ErrorKind, ProbeFailure, ProbeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Error label reported for dependencies skipped by an open breaker
pub const CIRCUIT_OPEN_LABEL: &str = "circuit_open";

/// Whether a dependency's failure flips overall readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyPolicy {
    /// Unhealthy means the system is not ready
    #[default]
    Required,
    /// Reported only
    Advisory,
}

/// Latest check for one dependency
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ServiceCheck {
    /// The probe ran (or timed out)
    Probed(ProbeResult),
    /// The breaker was open; the probe was not invoked
    SkippedBecauseOpen {
        dependency: DependencyId,
        observed_at: DateTime<Utc>,
    },
}

impl ServiceCheck {
    pub fn dependency(&self) -> &DependencyId {
        match self {
            ServiceCheck::Probed(result) => &result.dependency,
            ServiceCheck::SkippedBecauseOpen { dependency, .. } => dependency,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, ServiceCheck::Probed(result) if result.success)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ServiceCheck::SkippedBecauseOpen { .. })
    }

    /// Zero for skipped checks
    pub fn latency_ms(&self) -> u64 {
        match self {
            ServiceCheck::Probed(result) => result.latency_ms,
            ServiceCheck::SkippedBecauseOpen { .. } => 0,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ServiceCheck::Probed(result) => result.error_kind,
            ServiceCheck::SkippedBecauseOpen { .. } => None,
        }
    }

    /// Error label as exposed on the query surface
    pub fn error_label(&self) -> Option<&'static str> {
        match self {
            ServiceCheck::Probed(result) => result.error_kind.map(|kind| kind.as_str()),
            ServiceCheck::SkippedBecauseOpen { .. } => Some(CIRCUIT_OPEN_LABEL),
        }
    }
}

/// Aggregate readiness across all registered dependencies.
///
/// Immutable once built; every orchestrator run produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadinessSnapshot {
    pub services: BTreeMap<DependencyId, ServiceCheck>,
    pub system_ready: bool,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ReadinessSnapshot {
    /// Build a snapshot; `system_ready` is the AND over required dependencies
    pub fn new(
        services: BTreeMap<DependencyId, ServiceCheck>,
        policies: &BTreeMap<DependencyId, DependencyPolicy>,
        ttl: Duration,
    ) -> Self {
        let system_ready = services.iter().all(|(id, check)| {
            policies.get(id).copied().unwrap_or_default() == DependencyPolicy::Advisory
                || check.is_healthy()
        });
        let generated_at = Utc::now();
        Self {
            services,
            system_ready,
            generated_at,
            expires_at: generated_at + to_chrono(ttl),
        }
    }

    /// Snapshot in which every dependency failed with `failure`.
    ///
    /// Already expired when built, so it is never mistaken for fresh data.
    pub fn degraded(
        policies: &BTreeMap<DependencyId, DependencyPolicy>,
        failure: ProbeFailure,
    ) -> Self {
        let services = policies
            .keys()
            .map(|id| {
                (
                    id.clone(),
                    ServiceCheck::Probed(ProbeResult::failed(id.clone(), 0, failure.clone())),
                )
            })
            .collect();
        Self::new(services, policies, Duration::ZERO)
    }

    pub fn service(&self, id: &DependencyId) -> Option<&ServiceCheck> {
        self.services.get(id)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Time left until `expires_at`; zero once expired
    pub fn time_to_live(&self) -> Duration {
        (self.expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn healthy_count(&self) -> usize {
        self.services.values().filter(|check| check.is_healthy()).count()
    }

    /// Query-surface view of this snapshot
    pub fn report(&self) -> ReadinessReport {
        ReadinessReport {
            system_ready: self.system_ready,
            services: self
                .services
                .iter()
                .map(|(id, check)| {
                    (
                        id.clone(),
                        ServiceReport {
                            healthy: check.is_healthy(),
                            latency_ms: check.latency_ms(),
                            error_kind: check.error_label().map(str::to_string),
                        },
                    )
                })
                .collect(),
            generated_at: self.generated_at,
            expires_at: self.expires_at,
        }
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::days(36_500))
}

/// Readiness as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub system_ready: bool,
    pub services: BTreeMap<DependencyId, ServiceReport>,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Per-dependency entry of a [`ReadinessReport`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceReport {
    pub healthy: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_kind: Option<String>,
}
