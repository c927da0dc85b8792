//! Plain HTTP health endpoint probe

use super::classify::{classify_reqwest_error, classify_status, remaining};
use super::types::{Probe, ProbeFailure};
use reqwest::StatusCode;
use std::fmt;
use tokio::time::Instant;
use tracing::debug;

/// Probes a dependency by issuing `GET url`.
///
/// Healthy iff the response is 2xx, or exactly the configured expected status.
#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
    expected_status: Option<StatusCode>,
    bearer_token: Option<String>,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            expected_status: None,
            bearer_token: None,
        }
    }

    /// Require an exact status instead of any 2xx
    pub fn with_expected_status(mut self, status: StatusCode) -> Self {
        self.expected_status = Some(status);
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for HttpProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpProbe")
            .field("url", &self.url)
            .field("expected_status", &self.expected_status)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[async_trait::async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, deadline: Instant) -> Result<(), ProbeFailure> {
        let timeout = remaining(deadline)?;

        let mut request = self.client.get(&self.url).timeout(timeout);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        let status = response.status();
        debug!("HTTP probe {} answered {}", self.url, status);

        match self.expected_status {
            Some(expected) if status == expected => Ok(()),
            Some(expected) => Err(classify_status(status).unwrap_or_else(|| {
                ProbeFailure::protocol(format!("expected status {}, got {}", expected, status))
            })),
            None => classify_status(status).map_or(Ok(()), Err),
        }
    }
}
