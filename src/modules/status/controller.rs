use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

#[derive(Serialize)]
pub struct ServiceInfo {
    service: String,
    status: &'static str,
    health: &'static str,
    metrics: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    error: &'static str,
}

/// GET /
pub async fn root(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: state.service_name.clone(),
        status: "running",
        health: "/health",
        metrics: "/metrics",
    })
}

/// GET /health
///
/// Container-level liveness only; dependencies (database, cache) are not probed.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /healthz, plain-text variant for probes that only read the status line
pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse { error: "not found" }),
    )
}
