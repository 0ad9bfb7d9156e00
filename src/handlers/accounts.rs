use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    auth::{perm, require_permission, AdminIdentity, DropshipperIdentity, SupplierIdentity},
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, message_response, paginated_response, success_response,
        ListParams, StatusBody,
    },
    services::accounts::{
        CreateDropshipperAccount, CreateSupplierAccount, UpdateDropshipperAccount,
        UpdateSupplierAccount,
    },
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
    pub is_verified: bool,
}

// Admin: supplier accounts

pub async fn list_suppliers(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ACCOUNTS_VIEW).await?;

    let page = state
        .services
        .accounts
        .list_suppliers(params.page, params.per_page, params.search.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(paginated_response(
        page.accounts,
        params.page,
        params.per_page,
        page.total,
    ))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ACCOUNTS_VIEW).await?;

    let supplier = state
        .services
        .accounts
        .get_supplier(supplier_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Supplier {supplier_id} not found")))?;

    Ok(success_response(supplier))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Json(payload): Json<CreateSupplierAccount>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ACCOUNTS_MANAGE).await?;

    let supplier = state
        .services
        .accounts
        .create_supplier(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(supplier))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierAccount>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ACCOUNTS_MANAGE).await?;

    let supplier = state
        .services
        .accounts
        .update_supplier(supplier_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(supplier))
}

pub async fn set_supplier_status(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<StatusBody>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ACCOUNTS_MANAGE).await?;

    state
        .services
        .accounts
        .set_supplier_status(supplier_id, payload.is_active)
        .await
        .map_err(map_service_error)?;

    Ok(message_response("Supplier status updated"))
}

pub async fn set_supplier_verified(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<VerifyBody>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ACCOUNTS_MANAGE).await?;

    let supplier = state
        .services
        .accounts
        .set_supplier_verified(supplier_id, payload.is_verified)
        .await
        .map_err(map_service_error)?;

    if payload.is_verified {
        let vars = HashMap::from([("name".to_string(), supplier.name.clone())]);
        let _ = state
            .services
            .email
            .send_module_email("account_approved", &supplier.email, &vars)
            .await;
    }

    Ok(message_response("Supplier verification updated"))
}

// Admin: dropshipper accounts

pub async fn list_dropshippers(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ACCOUNTS_VIEW).await?;

    let page = state
        .services
        .accounts
        .list_dropshippers(params.page, params.per_page, params.search.as_deref())
        .await
        .map_err(map_service_error)?;

    Ok(paginated_response(
        page.accounts,
        params.page,
        params.per_page,
        page.total,
    ))
}

pub async fn get_dropshipper(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(dropshipper_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ACCOUNTS_VIEW).await?;

    let dropshipper = state
        .services
        .accounts
        .get_dropshipper(dropshipper_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Dropshipper {dropshipper_id} not found")))?;

    Ok(success_response(dropshipper))
}

pub async fn create_dropshipper(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Json(payload): Json<CreateDropshipperAccount>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ACCOUNTS_MANAGE).await?;

    let dropshipper = state
        .services
        .accounts
        .create_dropshipper(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(dropshipper))
}

pub async fn update_dropshipper(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(dropshipper_id): Path<Uuid>,
    Json(payload): Json<UpdateDropshipperAccount>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ACCOUNTS_MANAGE).await?;

    let dropshipper = state
        .services
        .accounts
        .update_dropshipper(dropshipper_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(dropshipper))
}

pub async fn set_dropshipper_status(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(dropshipper_id): Path<Uuid>,
    Json(payload): Json<StatusBody>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ACCOUNTS_MANAGE).await?;

    state
        .services
        .accounts
        .set_dropshipper_status(dropshipper_id, payload.is_active)
        .await
        .map_err(map_service_error)?;

    Ok(message_response("Dropshipper status updated"))
}

pub async fn set_dropshipper_verified(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(dropshipper_id): Path<Uuid>,
    Json(payload): Json<VerifyBody>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ACCOUNTS_MANAGE).await?;

    let dropshipper = state
        .services
        .accounts
        .set_dropshipper_verified(dropshipper_id, payload.is_verified)
        .await
        .map_err(map_service_error)?;

    if payload.is_verified {
        let vars = HashMap::from([("name".to_string(), dropshipper.name.clone())]);
        let _ = state
            .services
            .email
            .send_module_email("account_approved", &dropshipper.email, &vars)
            .await;
    }

    Ok(message_response("Dropshipper verification updated"))
}

// Own profiles

pub async fn supplier_profile(
    State(state): State<AppState>,
    identity: SupplierIdentity,
) -> Result<impl IntoResponse, ApiError> {
    let supplier = state
        .services
        .accounts
        .get_supplier(identity.0.account_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound("Supplier not found".to_string()))?;

    Ok(success_response(supplier))
}

pub async fn update_supplier_profile(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Json(payload): Json<UpdateSupplierAccount>,
) -> Result<impl IntoResponse, ApiError> {
    let supplier = state
        .services
        .accounts
        .update_supplier(identity.0.account_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(supplier))
}

pub async fn dropshipper_profile(
    State(state): State<AppState>,
    identity: DropshipperIdentity,
) -> Result<impl IntoResponse, ApiError> {
    let dropshipper = state
        .services
        .accounts
        .get_dropshipper(identity.0.account_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound("Dropshipper not found".to_string()))?;

    Ok(success_response(dropshipper))
}

pub async fn update_dropshipper_profile(
    State(state): State<AppState>,
    identity: DropshipperIdentity,
    Json(payload): Json<UpdateDropshipperAccount>,
) -> Result<impl IntoResponse, ApiError> {
    let dropshipper = state
        .services
        .accounts
        .update_dropshipper(identity.0.account_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(dropshipper))
}
