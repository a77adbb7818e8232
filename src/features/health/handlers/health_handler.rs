use crate::features::health::dtos::{
    BasicHealthDto, DetailedHealthDto, LivenessDto, ReadinessDto, ServiceStatus,
};
use crate::features::health::services::HealthService;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = BasicHealthDto)
    ),
    tag = "health"
)]
pub async fn health(State(service): State<Arc<HealthService>>) -> Json<BasicHealthDto> {
    Json(service.basic())
}

#[utoipa::path(
    get,
    path = "/health/detailed",
    responses(
        (status = 200, description = "All dependencies reachable", body = DetailedHealthDto),
        (status = 503, description = "One or more dependencies failing", body = DetailedHealthDto)
    ),
    tag = "health"
)]
pub async fn detailed_health(State(service): State<Arc<HealthService>>) -> Response {
    let report = service.detailed().await;
    let status = match report.service {
        ServiceStatus::Healthy => StatusCode::OK,
        ServiceStatus::Degraded | ServiceStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(report)).into_response()
}

#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Ready to serve traffic", body = ReadinessDto),
        (status = 503, description = "Database unreachable", body = ReadinessDto)
    ),
    tag = "health"
)]
pub async fn readiness(State(service): State<Arc<HealthService>>) -> Response {
    match service.readiness().await {
        Ok(ready) => (StatusCode::OK, Json(ready)).into_response(),
        Err(not_ready) => (StatusCode::SERVICE_UNAVAILABLE, Json(not_ready)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/live",
    responses(
        (status = 200, description = "Process is alive", body = LivenessDto)
    ),
    tag = "health"
)]
pub async fn liveness(State(service): State<Arc<HealthService>>) -> Json<LivenessDto> {
    Json(service.liveness())
}
