use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    auth::{perm, require_permission, AdminIdentity},
    errors::ApiError,
    handlers::common::{map_service_error, success_response},
    AppState,
};

/// Polls the courier for every shipped/RTO order with an AWB and folds the
/// statuses back into the delivery flags. Triggered by an external cron.
#[utoipa::path(
    post,
    path = "/api/v1/admin/shipping/refresh",
    tag = "shipping",
    responses((status = 200, description = "Refresh summary: checked/updated/failed"))
)]
pub async fn refresh_tracking(
    State(state): State<AppState>,
    identity: AdminIdentity,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::SHIPPING_MANAGE).await?;

    let summary = state
        .services
        .shipping
        .refresh_tracking()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(summary))
}

/// Live courier status for one order.
pub async fn track_order(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::SHIPPING_MANAGE).await?;

    let status = state
        .services
        .shipping
        .track_order(order_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(status))
}
