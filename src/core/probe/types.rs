//! Probe types and the probe capability trait

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;

/// Identifier of one monitored dependency
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyId(Arc<str>);

impl DependencyId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for DependencyId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DependencyId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for DependencyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DependencyId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

/// Failure taxonomy. The breaker treats every kind the same; the kinds exist
/// for observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    ConnectionRefused,
    AuthFailure,
    ProtocolError,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::ConnectionRefused => "connection_refused",
            ErrorKind::AuthFailure => "auth_failure",
            ErrorKind::ProtocolError => "protocol_error",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a probe call failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl ProbeFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn connection_refused(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConnectionRefused, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthFailure, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProtocolError, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Health probe for a single dependency.
///
/// Implementations must honour `deadline`; the orchestrator abandons calls
/// that run past it regardless. Probes share no state with the orchestrator.
#[async_trait::async_trait]
pub trait Probe: Send + Sync + fmt::Debug {
    async fn probe(&self, deadline: Instant) -> Result<(), ProbeFailure>;
}

/// Outcome of one attempted probe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub dependency: DependencyId,
    pub success: bool,
    pub latency_ms: u64,
    pub error_kind: Option<ErrorKind>,
    /// Failure message, if any
    pub detail: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl ProbeResult {
    pub fn healthy(dependency: DependencyId, latency_ms: u64) -> Self {
        Self {
            dependency,
            success: true,
            latency_ms,
            error_kind: None,
            detail: None,
            observed_at: Utc::now(),
        }
    }

    pub fn failed(dependency: DependencyId, latency_ms: u64, failure: ProbeFailure) -> Self {
        Self {
            dependency,
            success: false,
            latency_ms,
            error_kind: Some(failure.kind),
            detail: Some(failure.message),
            observed_at: Utc::now(),
        }
    }
}
