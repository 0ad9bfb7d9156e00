use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{perm, require_permission, AdminIdentity, Panel},
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, message_response, paginated_response,
        success_response,
    },
    services::roles::{CreateRoleRequest, UpdateRoleRequest},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct RoleListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub panel: Option<Panel>,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct SetPermissionBody {
    pub permission_id: Uuid,
    pub allowed: bool,
}

pub async fn list_roles(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Query(query): Query<RoleListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ROLES_MANAGE).await?;

    let (roles, total) = state
        .services
        .roles
        .list_roles(query.panel, query.page, query.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(paginated_response(roles, query.page, query.per_page, total))
}

pub async fn create_role(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ROLES_MANAGE).await?;

    let role = state
        .services
        .roles
        .create_role(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(role))
}

pub async fn get_role(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(role_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ROLES_MANAGE).await?;

    let detail = state
        .services
        .roles
        .get_role_detail(role_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(detail))
}

pub async fn update_role(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ROLES_MANAGE).await?;

    let role = state
        .services
        .roles
        .update_role(role_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(role))
}

pub async fn delete_role(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(role_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ROLES_MANAGE).await?;

    state
        .services
        .roles
        .delete_role(role_id)
        .await
        .map_err(map_service_error)?;

    Ok(message_response("Role deleted"))
}

pub async fn list_permissions(
    State(state): State<AppState>,
    identity: AdminIdentity,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ROLES_MANAGE).await?;

    let permissions = state
        .services
        .roles
        .list_permissions()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(permissions))
}

pub async fn set_role_permission(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<SetPermissionBody>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ROLES_MANAGE).await?;

    state
        .services
        .roles
        .set_permission(role_id, payload.permission_id, payload.allowed)
        .await
        .map_err(map_service_error)?;

    Ok(message_response("Permission updated"))
}
