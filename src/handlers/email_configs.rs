use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    auth::{perm, require_permission, AdminIdentity},
    errors::ApiError,
    handlers::common::{
        map_service_error, message_response, success_response, validate_input,
    },
    services::email::UpsertEmailConfigRequest,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct TestSendBody {
    #[validate(email)]
    pub to: String,
}

pub async fn list_email_configs(
    State(state): State<AppState>,
    identity: AdminIdentity,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::EMAIL_CONFIGS_MANAGE).await?;

    let configs = state
        .services
        .email
        .list_configs()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(configs))
}

pub async fn get_email_config(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(module): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::EMAIL_CONFIGS_MANAGE).await?;

    let config = state
        .services
        .email
        .get_config(&module)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(config))
}

pub async fn upsert_email_config(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Json(payload): Json<UpsertEmailConfigRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::EMAIL_CONFIGS_MANAGE).await?;

    let config = state
        .services
        .email
        .upsert_config(payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(config))
}

pub async fn delete_email_config(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(module): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::EMAIL_CONFIGS_MANAGE).await?;

    state
        .services
        .email
        .delete_config(&module)
        .await
        .map_err(map_service_error)?;

    Ok(message_response("Email config deleted"))
}

/// Renders the module's template with sample variables and submits it to
/// the configured mailer.
pub async fn test_send_email(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(module): Path<String>,
    Json(payload): Json<TestSendBody>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::EMAIL_CONFIGS_MANAGE).await?;
    validate_input(&payload)?;

    let submitted = state
        .services
        .email
        .test_send(&module, &payload.to)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({ "submitted": submitted })))
}
