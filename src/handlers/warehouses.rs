use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::{perm, require_permission, AdminIdentity, PanelIdentity, SupplierIdentity},
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, message_response, paginated_response,
        success_response, PaginationParams, StatusBody,
    },
    services::warehouses::{CreateWarehouseRequest, UpdateWarehouseRequest},
    AppState,
};

// Supplier panel

pub async fn list_warehouses(
    State(state): State<AppState>,
    identity: SupplierIdentity,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::WAREHOUSES_VIEW).await?;

    let warehouses = state
        .services
        .warehouses
        .list_supplier_warehouses(identity.account_id())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(warehouses))
}

pub async fn create_warehouse(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Json(payload): Json<CreateWarehouseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::WAREHOUSES_MANAGE).await?;

    let warehouse = state
        .services
        .warehouses
        .create_warehouse(identity.account_id(), payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(warehouse))
}

pub async fn update_warehouse(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Path(warehouse_id): Path<Uuid>,
    Json(payload): Json<UpdateWarehouseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::WAREHOUSES_MANAGE).await?;

    let warehouse = state
        .services
        .warehouses
        .update_warehouse(identity.account_id(), warehouse_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(warehouse))
}

pub async fn set_warehouse_status(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Path(warehouse_id): Path<Uuid>,
    Json(payload): Json<StatusBody>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::WAREHOUSES_MANAGE).await?;

    state
        .services
        .warehouses
        .set_warehouse_status(identity.account_id(), warehouse_id, payload.is_active)
        .await
        .map_err(map_service_error)?;

    Ok(message_response("Warehouse status updated"))
}

// Admin panel

pub async fn list_all_warehouses(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::WAREHOUSES_VIEW).await?;

    let (warehouses, total) = state
        .services
        .warehouses
        .list_all_warehouses(params.page, params.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(paginated_response(
        warehouses,
        params.page,
        params.per_page,
        total,
    ))
}
