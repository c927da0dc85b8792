//! Monitored dependency configuration

use crate::core::health::DependencyPolicy;
use serde::{Deserialize, Serialize};

/// One monitored dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyConfig {
    /// Unique dependency id
    pub id: String,
    /// Whether a failure flips overall readiness
    #[serde(default)]
    pub policy: DependencyPolicy,
    /// How to probe it
    pub probe: ProbeConfig,
}

/// Probe transport selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProbeConfig {
    /// `GET url`, healthy on 2xx or the expected status
    Http {
        url: String,
        #[serde(default)]
        expected_status: Option<u16>,
        #[serde(default)]
        bearer_token: Option<String>,
    },
    /// JSON-RPC 2.0 call
    JsonRpc {
        url: String,
        #[serde(default = "default_rpc_method")]
        method: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
}

impl ProbeConfig {
    pub fn url(&self) -> &str {
        match self {
            ProbeConfig::Http { url, .. } | ProbeConfig::JsonRpc { url, .. } => url,
        }
    }
}

fn default_rpc_method() -> String {
    crate::core::probe::rpc::DEFAULT_RPC_METHOD.to_string()
}
