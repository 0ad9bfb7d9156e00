use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    auth::{
        perm, require_permission, AdminIdentity, DropshipperIdentity, PanelIdentity,
        SupplierIdentity,
    },
    errors::ApiError,
    handlers::common::{map_service_error, success_response},
    services::reports::ReportScope,
    services::DateRange,
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Inclusive start date, `YYYY-MM-DD`
    pub from: Option<String>,
    /// Inclusive end date, `YYYY-MM-DD`
    pub to: Option<String>,
    /// Admin only: restrict to one dropshipper
    pub dropshipper_id: Option<Uuid>,
    /// Admin only: restrict to one supplier
    pub supplier_id: Option<Uuid>,
}

impl ReportQuery {
    fn range(&self) -> Result<DateRange, ApiError> {
        DateRange::parse(self.from.as_deref(), self.to.as_deref()).map_err(map_service_error)
    }
}

/// Platform-wide order report, bucketed by fulfillment model.
#[utoipa::path(
    get,
    path = "/api/v1/admin/reports/orders",
    tag = "reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Order report with shipowl/selfship buckets"),
        (status = 400, description = "Malformed date filter"),
    )
)]
pub async fn admin_order_report(
    State(state): State<AppState>,
    identity: AdminIdentity,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::REPORTS_VIEW).await?;
    let range = query.range()?;

    let report = state
        .services
        .reports
        .order_report(
            ReportScope {
                dropshipper_id: query.dropshipper_id,
                supplier_id: query.supplier_id,
            },
            range,
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(report))
}

pub async fn supplier_order_report(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::REPORTS_VIEW).await?;
    let range = query.range()?;

    let report = state
        .services
        .reports
        .order_report(
            ReportScope {
                supplier_id: Some(identity.account_id()),
                dropshipper_id: None,
            },
            range,
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(report))
}

pub async fn dropshipper_order_report(
    State(state): State<AppState>,
    identity: DropshipperIdentity,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::REPORTS_VIEW).await?;
    let range = query.range()?;

    let report = state
        .services
        .reports
        .order_report(
            ReportScope {
                dropshipper_id: Some(identity.account_id()),
                supplier_id: None,
            },
            range,
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(report))
}
