use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        order::{self, OrderStatus, PaymentMode, ShippingMethod},
        order_item, product,
    },
    errors::ServiceError,
    services::DateRange,
};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOrderItemInput {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 10_000))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub shipping_method: ShippingMethod,
    pub payment_mode: PaymentMode,
    pub warehouse_id: Option<Uuid>,
    pub shipping_cost: Option<Decimal>,
    pub cod_amount: Option<Decimal>,
    #[validate(length(min = 1, max = 120))]
    pub consignee_name: String,
    #[validate(length(min = 6, max = 20))]
    pub consignee_phone: String,
    #[validate(length(min = 1, max = 400))]
    pub consignee_address: String,
    #[validate(length(min = 1, max = 80))]
    pub consignee_city: String,
    #[validate(length(min = 1, max = 80))]
    pub consignee_state: String,
    #[validate(length(min = 4, max = 10))]
    pub consignee_pincode: String,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<CreateOrderItemInput>,
}

/// Visibility scope a caller lists orders under.
#[derive(Debug, Clone, Copy)]
pub enum OrderScope {
    All,
    Dropshipper(Uuid),
    Supplier(Uuid),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub range: DateRange,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

/// Order lifecycle service.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    fn generate_order_number() -> String {
        let stamp = Utc::now().format("%Y%m%d");
        let suffix = Uuid::new_v4().simple().to_string();
        format!("SO-{}-{}", stamp, &suffix[..8].to_uppercase())
    }

    /// Creates an order, snapshotting product name/SKU/prices onto its
    /// items inside one transaction.
    #[instrument(skip(self, request), fields(dropshipper_id = %dropshipper_id))]
    pub async fn create_order(
        &self,
        dropshipper_id: Uuid,
        request: CreateOrderRequest,
    ) -> Result<OrderDetail, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        for item in &request.items {
            item.validate()
                .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        }

        if request.payment_mode == PaymentMode::Postpaid && request.cod_amount.is_none() {
            return Err(ServiceError::ValidationError(
                "cod_amount is required for postpaid orders".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let product_ids: Vec<Uuid> = request.items.iter().map(|i| i.product_id).collect();
        let products = product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids.clone()))
            .filter(product::Column::IsPublished.eq(true))
            .filter(product::Column::IsActive.eq(true))
            .all(db)
            .await?;

        for item in &request.items {
            if !products.iter().any(|p| p.id == item.product_id) {
                return Err(ServiceError::NotFound(format!(
                    "Product {} not found",
                    item.product_id
                )));
            }
        }

        // One supplier per order: items route to a single warehouse.
        let supplier_id = products[0].supplier_id;
        if products.iter().any(|p| p.supplier_id != supplier_id) {
            return Err(ServiceError::ValidationError(
                "All items must belong to the same supplier".to_string(),
            ));
        }

        let mut total = Decimal::ZERO;
        for item in &request.items {
            let p = products
                .iter()
                .find(|p| p.id == item.product_id)
                .expect("checked above");
            total += p.price * Decimal::from(item.quantity);
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "failed to start order creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        let order_model = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(Self::generate_order_number()),
            dropshipper_id: Set(dropshipper_id),
            supplier_id: Set(supplier_id),
            warehouse_id: Set(request.warehouse_id),
            shipping_method: Set(request.shipping_method.to_string()),
            payment_mode: Set(request.payment_mode.to_string()),
            status: Set(OrderStatus::Pending.to_string()),
            courier_name: Set(None),
            awb_number: Set(None),
            shipping_cost: Set(request.shipping_cost),
            cod_amount: Set(request.cod_amount),
            total_amount: Set(total),
            delivered: Set(false),
            delivered_at: Set(None),
            rto: Set(false),
            rto_delivered: Set(false),
            rto_at: Set(None),
            last_tracking_status: Set(None),
            consignee_name: Set(request.consignee_name),
            consignee_phone: Set(request.consignee_phone),
            consignee_address: Set(request.consignee_address),
            consignee_city: Set(request.consignee_city),
            consignee_state: Set(request.consignee_state),
            consignee_pincode: Set(request.consignee_pincode),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let p = products
                .iter()
                .find(|p| p.id == item.product_id)
                .expect("checked above");
            let saved = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(p.id),
                sku: Set(p.sku.clone()),
                name: Set(p.name.clone()),
                quantity: Set(item.quantity),
                unit_price: Set(p.price),
                product_cost: Set(Some(p.cost_price)),
            }
            .insert(&txn)
            .await?;
            items.push(saved);
        }

        txn.commit().await?;

        info!(order_id = %order_id, dropshipper_id = %dropshipper_id, "order created");
        Ok(OrderDetail {
            order: order_model,
            items,
        })
    }

    fn scoped_query(scope: OrderScope) -> sea_orm::Select<order::Entity> {
        let query = order::Entity::find();
        match scope {
            OrderScope::All => query,
            OrderScope::Dropshipper(id) => query.filter(order::Column::DropshipperId.eq(id)),
            OrderScope::Supplier(id) => query.filter(order::Column::SupplierId.eq(id)),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        scope: OrderScope,
        filter: OrderFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<order::Model>, u64), ServiceError> {
        let mut query = Self::scoped_query(scope);
        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status.to_string()));
        }
        if let Some(from) = filter.range.from {
            query = query.filter(order::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.range.to_exclusive {
            query = query.filter(order::Column::CreatedAt.lt(to));
        }

        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((orders, total))
    }

    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        scope: OrderScope,
        order_id: Uuid,
    ) -> Result<OrderDetail, ServiceError> {
        let db = &*self.db_pool;
        let order = Self::scoped_query(scope)
            .filter(order::Column::Id.eq(order_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(db)
            .await?;

        Ok(OrderDetail { order, items })
    }

    fn parse_status(raw: &str) -> Result<OrderStatus, ServiceError> {
        OrderStatus::from_str(raw)
            .map_err(|_| ServiceError::InternalError(format!("corrupt order status '{raw}'")))
    }

    /// Applies a lifecycle transition, keeping the delivery/RTO flags in
    /// sync with the terminal states.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        next: OrderStatus,
    ) -> Result<order::Model, ServiceError> {
        let db = &*self.db_pool;
        let model = order::Entity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let current = Self::parse_status(&model.status)?;
        if !current.can_transition_to(next) {
            return Err(ServiceError::InvalidOperation(format!(
                "Cannot move order from {current} to {next}"
            )));
        }

        let now = Utc::now();
        let mut active: order::ActiveModel = model.into();
        active.status = Set(next.to_string());
        match next {
            OrderStatus::Delivered => {
                active.delivered = Set(true);
                active.delivered_at = Set(Some(now));
            }
            OrderStatus::Rto => {
                active.rto = Set(true);
            }
            OrderStatus::RtoDelivered => {
                active.rto = Set(true);
                active.rto_delivered = Set(true);
                active.rto_at = Set(Some(now));
            }
            _ => {}
        }
        active.updated_at = Set(Some(now));
        let updated = active.update(db).await?;

        info!(order_id = %order_id, status = %next, "order status updated");
        Ok(updated)
    }

    /// Assigns a courier and AWB to a packed order, moving it to shipped.
    #[instrument(skip(self))]
    pub async fn assign_courier(
        &self,
        order_id: Uuid,
        courier_name: String,
        awb_number: String,
    ) -> Result<order::Model, ServiceError> {
        if courier_name.trim().is_empty() || awb_number.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "courier_name and awb_number are required".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let model = order::Entity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let current = Self::parse_status(&model.status)?;
        if !current.can_transition_to(OrderStatus::Shipped) {
            return Err(ServiceError::InvalidOperation(format!(
                "Cannot ship an order in status {current}"
            )));
        }

        let mut active: order::ActiveModel = model.into();
        active.status = Set(OrderStatus::Shipped.to_string());
        active.courier_name = Set(Some(courier_name));
        active.awb_number = Set(Some(awb_number));
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        info!(order_id = %order_id, "courier assigned, order shipped");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: Uuid) -> Result<order::Model, ServiceError> {
        self.update_status(order_id, OrderStatus::Cancelled).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(OrderStatus::Pending, OrderStatus::Confirmed, true)]
    #[test_case(OrderStatus::Pending, OrderStatus::Cancelled, true)]
    #[test_case(OrderStatus::Confirmed, OrderStatus::Packed, true)]
    #[test_case(OrderStatus::Packed, OrderStatus::Shipped, true)]
    #[test_case(OrderStatus::Shipped, OrderStatus::Delivered, true)]
    #[test_case(OrderStatus::Shipped, OrderStatus::Rto, true)]
    #[test_case(OrderStatus::Rto, OrderStatus::RtoDelivered, true)]
    #[test_case(OrderStatus::Pending, OrderStatus::Shipped, false)]
    #[test_case(OrderStatus::Delivered, OrderStatus::Cancelled, false)]
    #[test_case(OrderStatus::Shipped, OrderStatus::Cancelled, false)]
    #[test_case(OrderStatus::Cancelled, OrderStatus::Confirmed, false)]
    fn status_transitions(from: OrderStatus, to: OrderStatus, expected: bool) {
        assert_eq!(from.can_transition_to(to), expected);
    }

    #[test]
    fn trackable_states() {
        assert!(OrderStatus::Shipped.is_trackable());
        assert!(OrderStatus::Rto.is_trackable());
        assert!(!OrderStatus::Delivered.is_trackable());
        assert!(!OrderStatus::Pending.is_trackable());
    }

    #[test]
    fn order_numbers_are_unique_and_prefixed() {
        let a = OrderService::generate_order_number();
        let b = OrderService::generate_order_number();
        assert!(a.starts_with("SO-"));
        assert_ne!(a, b);
    }
}
