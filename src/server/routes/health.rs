//! Readiness and liveness endpoints

use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

/// Configure health routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/health")
            .route("/ready", web::get().to(readiness))
            .route("/live", web::get().to(liveness))
            .route("/breakers", web::get().to(breakers))
            .route("/metrics", web::get().to(metrics))
            .route("/transitions", web::get().to(transitions)),
    );
}

#[derive(Debug, Default, Deserialize)]
pub struct ReadinessQuery {
    /// Bypass the cache TTL and force a refresh
    #[serde(default)]
    pub refresh: bool,
}

/// Liveness payload
#[derive(Debug, Clone, Serialize)]
pub struct LivenessStatus {
    pub status: Cow<'static, str>,
    pub version: Cow<'static, str>,
    pub uptime_seconds: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Aggregate readiness.
///
/// 200 with the readiness report when every required dependency is healthy,
/// 503 with the same body otherwise.
pub async fn readiness(
    state: web::Data<AppState>,
    query: web::Query<ReadinessQuery>,
) -> ActixResult<HttpResponse> {
    let snapshot = if query.refresh {
        state.cache.refresh().await
    } else {
        state.cache.get().await
    };
    debug!(
        "Readiness requested: ready={}, generated_at={}",
        snapshot.system_ready, snapshot.generated_at
    );

    let report = snapshot.report();
    let mut response = if report.system_ready {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    Ok(response.json(report))
}

/// Process liveness; never touches dependencies
pub async fn liveness(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let status = LivenessStatus {
        status: Cow::Borrowed("alive"),
        version: Cow::Borrowed(env!("CARGO_PKG_VERSION")),
        uptime_seconds: state.uptime_seconds(),
        timestamp: chrono::Utc::now(),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(status)))
}

/// Circuit breaker state per dependency
pub async fn breakers(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let statuses = state.cache.orchestrator().breaker_statuses();
    Ok(HttpResponse::Ok().json(ApiResponse::success(statuses)))
}

/// Aggregated readiness statistics
pub async fn metrics(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    match &state.metrics {
        Some(metrics) => Ok(HttpResponse::Ok().json(ApiResponse::success(metrics.report()))),
        None => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error("background monitor is disabled"))),
    }
}

/// Recent health transitions, newest last
pub async fn transitions(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    match &state.alerts {
        Some(alerts) => Ok(HttpResponse::Ok().json(ApiResponse::success(alerts.recent()))),
        None => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error("background monitor is disabled"))),
    }
}
