//! Transition alert types

use crate::core::probe::DependencyId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Scope label used for the aggregate readiness transition
pub const SYSTEM_SCOPE: &str = "system";

/// Health of a dependency or of the whole system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl From<bool> for HealthStatus {
    fn from(healthy: bool) -> Self {
        if healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// What a transition is about.
///
/// Serialized as the dependency id, or `"system"` for aggregate readiness.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlertScope {
    Dependency(DependencyId),
    System,
}

impl AlertScope {
    pub fn as_str(&self) -> &str {
        match self {
            AlertScope::Dependency(id) => id.as_str(),
            AlertScope::System => SYSTEM_SCOPE,
        }
    }
}

impl fmt::Display for AlertScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AlertScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AlertScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let scope = String::deserialize(deserializer)?;
        Ok(if scope == SYSTEM_SCOPE {
            AlertScope::System
        } else {
            AlertScope::Dependency(DependencyId::new(scope))
        })
    }
}

/// A health status change observed between two consecutive monitor runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub id: Uuid,
    pub scope: AlertScope,
    pub from: HealthStatus,
    pub to: HealthStatus,
    pub at: DateTime<Utc>,
    /// Error label of the new state, when it is unhealthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl Transition {
    pub fn new(scope: AlertScope, from: HealthStatus, to: HealthStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope,
            from,
            to,
            at: Utc::now(),
            error_kind: None,
        }
    }

    pub fn with_error_kind(mut self, error_kind: impl Into<String>) -> Self {
        self.error_kind = Some(error_kind.into());
        self
    }

    pub fn is_recovery(&self) -> bool {
        self.to == HealthStatus::Healthy
    }

    /// One-line human readable description
    pub fn summary(&self) -> String {
        match &self.error_kind {
            Some(kind) => format!("{}: {} -> {} ({})", self.scope, self.from, self.to, kind),
            None => format!("{}: {} -> {}", self.scope, self.from, self.to),
        }
    }
}
