use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    errors::{ApiError, ServiceError},
    ApiResponse, PaginatedResponse,
};

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Success response carrying only a message
pub fn message_response(message: impl Into<String>) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::<()>::message(message.into())),
    )
        .into_response()
}

/// Standard paginated response
pub fn paginated_response<T: Serialize>(
    items: Vec<T>,
    page: u64,
    per_page: u64,
    total: u64,
) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::success(PaginatedResponse::new(
            items, page, per_page, total,
        ))),
    )
        .into_response()
}

/// Validate request input, collecting field errors into the error body.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input.validate().map_err(|errs| {
        let details: Vec<String> = errs
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| format!("{field}: {m}"))
                        .unwrap_or_else(|| format!("{field}: invalid value"))
                })
            })
            .collect();
        ApiError::ValidationFailed(details)
    })
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::Service(err)
}

/// Pagination parameters for list operations
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// Pagination plus the free-text search accepted by listing endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub search: Option<String>,
}

/// Body of the status toggle endpoints.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub is_active: bool,
}
