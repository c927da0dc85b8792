//! Server configuration

use super::*;
use serde::{Deserialize, Serialize};

/// HTTP server configuration for the readiness endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Number of worker threads
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

impl ServerConfig {
    /// Socket address string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
