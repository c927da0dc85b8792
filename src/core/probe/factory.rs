//! Building probes from configuration

use super::http::HttpProbe;
use super::rpc::JsonRpcProbe;
use super::types::Probe;
use crate::config::{DependencyConfig, ProbeConfig};
use crate::utils::error::{ReadinessError, Result};
use reqwest::StatusCode;
use std::sync::Arc;

/// Build the probe described by a dependency's configuration.
///
/// All probes share `client` so connection pools are reused across runs.
pub fn build_probe(
    config: &DependencyConfig,
    client: &reqwest::Client,
) -> Result<Arc<dyn Probe>> {
    let probe: Arc<dyn Probe> = match &config.probe {
        ProbeConfig::Http {
            url,
            expected_status,
            bearer_token,
        } => {
            let mut probe = HttpProbe::with_client(client.clone(), url.clone());
            if let Some(code) = expected_status {
                let status = StatusCode::from_u16(*code).map_err(|e| {
                    ReadinessError::Config(format!(
                        "Dependency '{}' has invalid expected_status {}: {}",
                        config.id, code, e
                    ))
                })?;
                probe = probe.with_expected_status(status);
            }
            if let Some(token) = bearer_token {
                probe = probe.with_bearer_token(token.clone());
            }
            Arc::new(probe)
        }
        ProbeConfig::JsonRpc {
            url,
            method,
            username,
            password,
        } => {
            let mut probe =
                JsonRpcProbe::with_client(client.clone(), url.clone()).with_method(method.clone());
            if let (Some(username), Some(password)) = (username, password) {
                probe = probe.with_basic_auth(username.clone(), password.clone());
            }
            Arc::new(probe)
        }
    };
    Ok(probe)
}
