//! Mapping transport failures onto the probe error taxonomy

use super::types::ProbeFailure;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::Instant;

/// Classify a reqwest transport error
pub(super) fn classify_reqwest_error(err: &reqwest::Error) -> ProbeFailure {
    if err.is_timeout() {
        ProbeFailure::timeout(err.to_string())
    } else if err.is_connect() {
        ProbeFailure::connection_refused(err.to_string())
    } else if err.is_decode() || err.is_body() {
        ProbeFailure::protocol(err.to_string())
    } else if let Some(status) = err.status() {
        classify_status(status).unwrap_or_else(|| ProbeFailure::unknown(err.to_string()))
    } else {
        ProbeFailure::unknown(err.to_string())
    }
}

/// Classify an HTTP status; `None` means the status is healthy
pub(super) fn classify_status(status: StatusCode) -> Option<ProbeFailure> {
    if status.is_success() {
        return None;
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Some(ProbeFailure::auth(format!("rejected with status {}", status)))
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            Some(ProbeFailure::timeout(format!("upstream timeout {}", status)))
        }
        _ => Some(ProbeFailure::protocol(format!(
            "unexpected status {}",
            status
        ))),
    }
}

/// Time left until `deadline`, or a timeout failure if it already passed
pub(super) fn remaining(deadline: Instant) -> Result<Duration, ProbeFailure> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        Err(ProbeFailure::timeout("deadline already elapsed"))
    } else {
        Ok(left)
    }
}
