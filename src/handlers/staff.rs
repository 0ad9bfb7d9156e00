//! Staff management handlers, generic over the panel identity so the same
//! functions serve `/admin/staff`, `/supplier/staff` and
//! `/dropshipper/staff`.

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::{perm, require_permission, PanelIdentity},
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, message_response, paginated_response, StatusBody,
        ListParams,
    },
    services::staff::{CreateStaffRequest, UpdateStaffRequest},
    AppState,
};

pub async fn list_staff<I>(
    State(state): State<AppState>,
    identity: I,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError>
where
    I: PanelIdentity + FromRequestParts<AppState, Rejection = ApiError>,
{
    require_permission(&state, &identity, perm::STAFF_MANAGE).await?;

    let (staff, total) = state
        .services
        .staff
        .list_staff(I::PANEL, identity.account_id(), params.page, params.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(paginated_response(
        staff,
        params.page,
        params.per_page,
        total,
    ))
}

pub async fn create_staff<I>(
    State(state): State<AppState>,
    identity: I,
    Json(payload): Json<CreateStaffRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    I: PanelIdentity + FromRequestParts<AppState, Rejection = ApiError>,
{
    require_permission(&state, &identity, perm::STAFF_MANAGE).await?;

    let staff = state
        .services
        .staff
        .create_staff(I::PANEL, identity.account_id(), payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(staff))
}

pub async fn update_staff<I>(
    State(state): State<AppState>,
    identity: I,
    Path(staff_id): Path<Uuid>,
    Json(payload): Json<UpdateStaffRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    I: PanelIdentity + FromRequestParts<AppState, Rejection = ApiError>,
{
    require_permission(&state, &identity, perm::STAFF_MANAGE).await?;

    let staff = state
        .services
        .staff
        .update_staff(I::PANEL, identity.account_id(), staff_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(crate::handlers::common::success_response(staff))
}

pub async fn set_staff_status<I>(
    State(state): State<AppState>,
    identity: I,
    Path(staff_id): Path<Uuid>,
    Json(payload): Json<StatusBody>,
) -> Result<impl IntoResponse, ApiError>
where
    I: PanelIdentity + FromRequestParts<AppState, Rejection = ApiError>,
{
    require_permission(&state, &identity, perm::STAFF_MANAGE).await?;

    state
        .services
        .staff
        .set_staff_status(I::PANEL, identity.account_id(), staff_id, payload.is_active)
        .await
        .map_err(map_service_error)?;

    Ok(message_response("Staff status updated"))
}

pub async fn delete_staff<I>(
    State(state): State<AppState>,
    identity: I,
    Path(staff_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
    I: PanelIdentity + FromRequestParts<AppState, Rejection = ApiError>,
{
    require_permission(&state, &identity, perm::STAFF_MANAGE).await?;

    state
        .services
        .staff
        .delete_staff(I::PANEL, identity.account_id(), staff_id)
        .await
        .map_err(map_service_error)?;

    Ok(message_response("Staff deleted"))
}
