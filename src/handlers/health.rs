use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use crate::{errors::ApiError, handlers::common::success_response, AppState};

/// Service identification and build info.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "health",
    responses((status = 200, description = "Service status"))
)]
pub async fn api_status() -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(json!({
        "service": "shipowl-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// Liveness plus database connectivity.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses((status = 200, description = "Health check result"))
)]
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Ok(success_response(json!({
        "status": db_status,
        "checks": { "database": db_status },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
