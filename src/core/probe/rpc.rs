//! JSON-RPC 2.0 probe for full-node style services

use super::classify::{classify_reqwest_error, classify_status, remaining};
use super::types::{Probe, ProbeFailure};
use serde_json::{Value, json};
use std::fmt;
use tokio::time::Instant;
use tracing::debug;

/// Default method used to ask a node whether it is alive
pub const DEFAULT_RPC_METHOD: &str = "getblockchaininfo";

/// Probes a JSON-RPC endpoint with a single parameterless call.
///
/// Healthy iff the HTTP status is 2xx and the body is a JSON-RPC response
/// without an `error` member.
#[derive(Clone)]
pub struct JsonRpcProbe {
    client: reqwest::Client,
    url: String,
    method: String,
    credentials: Option<(String, String)>,
}

impl JsonRpcProbe {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            method: DEFAULT_RPC_METHOD.to_string(),
            credentials: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    fn request_body(&self) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": "readiness",
            "method": self.method,
            "params": [],
        })
    }
}

impl fmt::Debug for JsonRpcProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpcProbe")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("credentials", &self.credentials.as_ref().map(|(user, _)| user))
            .finish()
    }
}

/// Inspect a decoded JSON-RPC response body
fn check_rpc_body(body: &Value) -> Result<(), ProbeFailure> {
    match body.get("error") {
        Some(Value::Null) | None => {}
        Some(error) => {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ProbeFailure::protocol(format!("rpc error: {}", message)));
        }
    }
    if body.get("result").is_none() {
        return Err(ProbeFailure::protocol("response has neither result nor error"));
    }
    Ok(())
}

#[async_trait::async_trait]
impl Probe for JsonRpcProbe {
    async fn probe(&self, deadline: Instant) -> Result<(), ProbeFailure> {
        let timeout = remaining(deadline)?;

        let mut request = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .json(&self.request_body());
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        let status = response.status();
        debug!("RPC probe {} {} answered {}", self.url, self.method, status);

        if let Some(failure) = classify_status(status) {
            return Err(failure);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        check_rpc_body(&body)
    }
}
