use crate::infra::AppState;
use accident_risk::{risk_router, RiskContext};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct StatusResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

impl StatusResponse {
    fn now(status: &'static str) -> Self {
        Self {
            status,
            timestamp: Utc::now(),
        }
    }
}

pub(crate) fn with_operational_routes(context: Arc<RiskContext>) -> axum::Router {
    risk_router(context)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<StatusResponse> {
    Json(StatusResponse::now("ok"))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        StatusResponse::now("ready")
    } else {
        StatusResponse::now("initializing")
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
