use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    couriers::{CourierClient, TrackingState, TrackingStatus},
    db::DbPool,
    entities::order::{self, OrderStatus},
    errors::ServiceError,
};

/// Outcome of one tracking refresh run.
#[derive(Debug, Default, Serialize)]
pub struct RefreshSummary {
    pub checked: u64,
    pub updated: u64,
    pub failed: u64,
}

/// Polls the courier per pending order and folds the result back into the
/// delivery/RTO flags. Triggered externally; there is no scheduler.
#[derive(Clone)]
pub struct ShippingService {
    db_pool: Arc<DbPool>,
    courier: Arc<dyn CourierClient>,
}

impl ShippingService {
    pub fn new(db_pool: Arc<DbPool>, courier: Arc<dyn CourierClient>) -> Self {
        Self { db_pool, courier }
    }

    /// Refreshes every shipped or RTO-in-progress order with an AWB.
    ///
    /// Per-order courier failures are logged and skipped so one flaky AWB
    /// does not abort the run.
    #[instrument(skip(self))]
    pub async fn refresh_tracking(&self) -> Result<RefreshSummary, ServiceError> {
        let db = &*self.db_pool;

        let pending = order::Entity::find()
            .filter(
                Condition::any()
                    .add(order::Column::Status.eq(OrderStatus::Shipped.to_string()))
                    .add(order::Column::Status.eq(OrderStatus::Rto.to_string())),
            )
            .filter(order::Column::AwbNumber.is_not_null())
            .all(db)
            .await?;

        let mut summary = RefreshSummary::default();

        for order_model in pending {
            summary.checked += 1;
            let awb = match order_model.awb_number.as_deref() {
                Some(awb) if !awb.is_empty() => awb.to_string(),
                _ => continue,
            };

            match self.courier.track(&awb).await {
                Ok(status) => {
                    match self.apply_tracking(order_model, &status).await {
                        Ok(true) => summary.updated += 1,
                        Ok(false) => {}
                        Err(err) => {
                            warn!(awb, error = %err, "failed to persist tracking update");
                            summary.failed += 1;
                        }
                    }
                }
                Err(err) => {
                    warn!(awb, error = %err, "courier tracking call failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            checked = summary.checked,
            updated = summary.updated,
            failed = summary.failed,
            "tracking refresh finished"
        );
        Ok(summary)
    }

    /// Folds one courier status into the order. Returns whether anything
    /// changed.
    async fn apply_tracking(
        &self,
        model: order::Model,
        status: &TrackingStatus,
    ) -> Result<bool, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();
        let previous_raw = model.last_tracking_status.clone();

        let mut active: order::ActiveModel = model.into();
        let mut changed = previous_raw.as_deref() != Some(status.raw_status.as_str());
        active.last_tracking_status = Set(Some(status.raw_status.clone()));

        match status.state {
            TrackingState::Delivered => {
                active.status = Set(OrderStatus::Delivered.to_string());
                active.delivered = Set(true);
                active.delivered_at = Set(Some(status.timestamp.unwrap_or(now)));
                changed = true;
            }
            TrackingState::RtoInitiated => {
                active.status = Set(OrderStatus::Rto.to_string());
                active.rto = Set(true);
                changed = true;
            }
            TrackingState::RtoDelivered => {
                active.status = Set(OrderStatus::RtoDelivered.to_string());
                active.rto = Set(true);
                active.rto_delivered = Set(true);
                active.rto_at = Set(Some(status.timestamp.unwrap_or(now)));
                changed = true;
            }
            TrackingState::InTransit | TrackingState::OutForDelivery | TrackingState::Unknown => {}
        }

        if changed {
            active.updated_at = Set(Some(now));
            active.update(db).await?;
        }
        Ok(changed)
    }

    /// Live tracking status for a single order.
    #[instrument(skip(self))]
    pub async fn track_order(&self, order_id: Uuid) -> Result<TrackingStatus, ServiceError> {
        let db = &*self.db_pool;
        let model = order::Entity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let awb = model
            .awb_number
            .filter(|awb| !awb.is_empty())
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order {order_id} has no AWB assigned"))
            })?;

        self.courier.track(&awb).await
    }
}
