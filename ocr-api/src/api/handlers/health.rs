use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

/// Returned by `GET /`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthStatus {
    pub status: String,
}

/// `GET /`
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service name and version", body = ServiceInfo),
    )
)]
pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    tracing::info!("Health check request received");

    Json(ServiceInfo {
        message: "OCR API is running".to_string(),
        name: state.config.app.name.clone(),
        version: state.config.app.version.clone(),
    })
}

/// `GET /health`
///
/// Liveness only. Does not touch the upstream services.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthStatus),
    )
)]
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
    })
}
