use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    auth::{
        perm, require_permission, AdminIdentity, DropshipperIdentity, PanelIdentity,
        SupplierIdentity,
    },
    entities::order::OrderStatus,
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, paginated_response, success_response,
    },
    services::orders::{CreateOrderRequest, OrderFilter, OrderScope},
    services::DateRange,
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    /// Lifecycle status filter, e.g. `shipped`
    pub status: Option<String>,
    /// Inclusive start date, `YYYY-MM-DD`
    pub from: Option<String>,
    /// Inclusive end date, `YYYY-MM-DD`
    pub to: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl OrderListQuery {
    fn filter(&self) -> Result<OrderFilter, ApiError> {
        let status = self
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|raw| {
                OrderStatus::from_str(raw)
                    .map_err(|_| ApiError::BadRequest(format!("Unknown order status '{raw}'")))
            })
            .transpose()?;

        let range = DateRange::parse(self.from.as_deref(), self.to.as_deref())
            .map_err(map_service_error)?;

        Ok(OrderFilter { status, range })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignCourierBody {
    pub courier_name: String,
    pub awb_number: String,
}

// Dropshipper panel

pub async fn create_order(
    State(state): State<AppState>,
    identity: DropshipperIdentity,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ORDERS_MANAGE).await?;

    let detail = state
        .services
        .orders
        .create_order(identity.account_id(), payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(detail))
}

pub async fn list_dropshipper_orders(
    State(state): State<AppState>,
    identity: DropshipperIdentity,
    Query(query): Query<OrderListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ORDERS_VIEW).await?;
    let filter = query.filter()?;

    let (orders, total) = state
        .services
        .orders
        .list_orders(
            OrderScope::Dropshipper(identity.account_id()),
            filter,
            query.page,
            query.per_page,
        )
        .await
        .map_err(map_service_error)?;

    Ok(paginated_response(orders, query.page, query.per_page, total))
}

pub async fn get_dropshipper_order(
    State(state): State<AppState>,
    identity: DropshipperIdentity,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ORDERS_VIEW).await?;

    let detail = state
        .services
        .orders
        .get_order(OrderScope::Dropshipper(identity.account_id()), order_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(detail))
}

// Supplier panel

pub async fn list_supplier_orders(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Query(query): Query<OrderListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ORDERS_VIEW).await?;
    let filter = query.filter()?;

    let (orders, total) = state
        .services
        .orders
        .list_orders(
            OrderScope::Supplier(identity.account_id()),
            filter,
            query.page,
            query.per_page,
        )
        .await
        .map_err(map_service_error)?;

    Ok(paginated_response(orders, query.page, query.per_page, total))
}

pub async fn get_supplier_order(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ORDERS_VIEW).await?;

    let detail = state
        .services
        .orders
        .get_order(OrderScope::Supplier(identity.account_id()), order_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(detail))
}

// Admin panel

/// List orders across all tenants
#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    tag = "orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Paginated orders"),
        (status = 400, description = "Bad status or date filter"),
    )
)]
pub async fn list_admin_orders(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Query(query): Query<OrderListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ORDERS_VIEW).await?;
    let filter = query.filter()?;

    let (orders, total) = state
        .services
        .orders
        .list_orders(OrderScope::All, filter, query.page, query.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(paginated_response(orders, query.page, query.per_page, total))
}

pub async fn get_admin_order(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ORDERS_VIEW).await?;

    let detail = state
        .services
        .orders
        .get_order(OrderScope::All, order_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(detail))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusBody>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ORDERS_MANAGE).await?;

    let order = state
        .services
        .orders
        .update_status(order_id, payload.status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

/// Assigns a courier/AWB and notifies the dropshipper best-effort.
pub async fn assign_courier(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AssignCourierBody>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ORDERS_MANAGE).await?;

    let order = state
        .services
        .orders
        .assign_courier(order_id, payload.courier_name, payload.awb_number)
        .await
        .map_err(map_service_error)?;

    if let Ok(Some(dropshipper)) = state
        .services
        .accounts
        .get_dropshipper(order.dropshipper_id)
        .await
    {
        let vars = HashMap::from([
            ("name".to_string(), dropshipper.name.clone()),
            ("order_number".to_string(), order.order_number.clone()),
            (
                "awb_number".to_string(),
                order.awb_number.clone().unwrap_or_default(),
            ),
        ]);
        let _ = state
            .services
            .email
            .send_module_email("order_shipped", &dropshipper.email, &vars)
            .await;
    }

    Ok(success_response(order))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::ORDERS_MANAGE).await?;

    let order = state
        .services
        .orders
        .cancel_order(order_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}
