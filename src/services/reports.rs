use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        order::{self, PaymentMode, ShippingMethod},
        order_item,
    },
    errors::ServiceError,
    services::DateRange,
};

/// Aggregated figures for one fulfillment bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportBucket {
    pub order_count: u64,
    pub item_count: i64,
    pub delivered_count: u64,
    pub rto_count: u64,
    pub product_cost: Decimal,
    pub shipping_cost: Decimal,
    pub cod_collected: Decimal,
    pub remittance: Decimal,
}

impl ReportBucket {
    fn absorb(&mut self, other: &ReportBucket) {
        self.order_count += other.order_count;
        self.item_count += other.item_count;
        self.delivered_count += other.delivered_count;
        self.rto_count += other.rto_count;
        self.product_cost += other.product_cost;
        self.shipping_cost += other.shipping_cost;
        self.cod_collected += other.cod_collected;
        self.remittance += other.remittance;
    }
}

/// Order report split by fulfillment model: platform-shipped (shipowl)
/// versus supplier-shipped (selfship), the latter split by payment mode.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderReport {
    pub shipowl: ReportBucket,
    pub selfship_prepaid: ReportBucket,
    pub selfship_postpaid: ReportBucket,
    pub totals: ReportBucket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BucketKind {
    Shipowl,
    SelfshipPrepaid,
    SelfshipPostpaid,
}

fn classify(order: &order::Model) -> BucketKind {
    let method = ShippingMethod::from_str(&order.shipping_method)
        .unwrap_or(ShippingMethod::Selfship);
    if method == ShippingMethod::Shipowl {
        return BucketKind::Shipowl;
    }
    match PaymentMode::from_str(&order.payment_mode).unwrap_or(PaymentMode::Postpaid) {
        PaymentMode::Prepaid => BucketKind::SelfshipPrepaid,
        PaymentMode::Postpaid => BucketKind::SelfshipPostpaid,
    }
}

/// Single pass over orders and their items.
///
/// Missing money fields count as zero. COD is only considered collected on
/// delivered postpaid orders. Remittance is derived per bucket after the
/// pass: COD collected minus shipping cost, additionally minus product cost
/// for the shipowl bucket where the platform fronts the goods.
pub fn aggregate_orders(
    orders: &[order::Model],
    items_by_order: &HashMap<Uuid, Vec<order_item::Model>>,
) -> OrderReport {
    let mut report = OrderReport::default();

    for order in orders {
        let bucket = match classify(order) {
            BucketKind::Shipowl => &mut report.shipowl,
            BucketKind::SelfshipPrepaid => &mut report.selfship_prepaid,
            BucketKind::SelfshipPostpaid => &mut report.selfship_postpaid,
        };

        bucket.order_count += 1;

        if let Some(items) = items_by_order.get(&order.id) {
            for item in items {
                bucket.item_count += i64::from(item.quantity);
                bucket.product_cost +=
                    item.product_cost.unwrap_or(Decimal::ZERO) * Decimal::from(item.quantity);
            }
        }

        bucket.shipping_cost += order.shipping_cost.unwrap_or(Decimal::ZERO);

        if order.rto {
            bucket.rto_count += 1;
        }

        if order.delivered {
            bucket.delivered_count += 1;
            let postpaid = PaymentMode::from_str(&order.payment_mode)
                .map(|m| m == PaymentMode::Postpaid)
                .unwrap_or(false);
            if postpaid {
                bucket.cod_collected += order.cod_amount.unwrap_or(Decimal::ZERO);
            }
        }
    }

    report.shipowl.remittance =
        report.shipowl.cod_collected - report.shipowl.product_cost - report.shipowl.shipping_cost;
    report.selfship_prepaid.remittance =
        report.selfship_prepaid.cod_collected - report.selfship_prepaid.shipping_cost;
    report.selfship_postpaid.remittance =
        report.selfship_postpaid.cod_collected - report.selfship_postpaid.shipping_cost;

    report.totals = ReportBucket::default();
    report.totals.absorb(&report.shipowl);
    report.totals.absorb(&report.selfship_prepaid);
    report.totals.absorb(&report.selfship_postpaid);

    report
}

/// Tenant filter for a report run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportScope {
    pub dropshipper_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn order_report(
        &self,
        scope: ReportScope,
        range: DateRange,
    ) -> Result<OrderReport, ServiceError> {
        let db = &*self.db_pool;

        let mut query = order::Entity::find();
        if let Some(id) = scope.dropshipper_id {
            query = query.filter(order::Column::DropshipperId.eq(id));
        }
        if let Some(id) = scope.supplier_id {
            query = query.filter(order::Column::SupplierId.eq(id));
        }
        if let Some(from) = range.from {
            query = query.filter(order::Column::CreatedAt.gte(from));
        }
        if let Some(to) = range.to_exclusive {
            query = query.filter(order::Column::CreatedAt.lt(to));
        }

        let orders = query.all(db).await?;

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let mut items_by_order: HashMap<Uuid, Vec<order_item::Model>> = HashMap::new();
        if !order_ids.is_empty() {
            let items = order_item::Entity::find()
                .filter(order_item::Column::OrderId.is_in(order_ids))
                .all(db)
                .await?;
            for item in items {
                items_by_order.entry(item.order_id).or_default().push(item);
            }
        }

        Ok(aggregate_orders(&orders, &items_by_order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn test_order(
        shipping_method: ShippingMethod,
        payment_mode: PaymentMode,
        shipping_cost: Option<Decimal>,
        cod_amount: Option<Decimal>,
        delivered: bool,
        rto: bool,
    ) -> order::Model {
        let now = Utc::now();
        order::Model {
            id: Uuid::new_v4(),
            order_number: format!("SO-TEST-{}", Uuid::new_v4().simple()),
            dropshipper_id: Uuid::new_v4(),
            supplier_id: Uuid::new_v4(),
            warehouse_id: None,
            shipping_method: shipping_method.to_string(),
            payment_mode: payment_mode.to_string(),
            status: "delivered".to_string(),
            courier_name: None,
            awb_number: None,
            shipping_cost,
            cod_amount,
            total_amount: dec!(0),
            delivered,
            delivered_at: delivered.then(|| now),
            rto,
            rto_delivered: false,
            rto_at: None,
            last_tracking_status: None,
            consignee_name: "A".to_string(),
            consignee_phone: "9999999999".to_string(),
            consignee_address: "addr".to_string(),
            consignee_city: "city".to_string(),
            consignee_state: "state".to_string(),
            consignee_pincode: "110001".to_string(),
            created_at: now,
            updated_at: Some(now),
        }
    }

    fn test_item(order_id: Uuid, quantity: i32, product_cost: Option<Decimal>) -> order_item::Model {
        order_item::Model {
            id: Uuid::new_v4(),
            order_id,
            product_id: Uuid::new_v4(),
            sku: "SKU".to_string(),
            name: "Widget".to_string(),
            quantity,
            unit_price: dec!(10),
            product_cost,
        }
    }

    #[test]
    fn classifies_into_three_buckets() {
        let shipowl = test_order(
            ShippingMethod::Shipowl,
            PaymentMode::Postpaid,
            None,
            None,
            false,
            false,
        );
        let prepaid = test_order(
            ShippingMethod::Selfship,
            PaymentMode::Prepaid,
            None,
            None,
            false,
            false,
        );
        let postpaid = test_order(
            ShippingMethod::Selfship,
            PaymentMode::Postpaid,
            None,
            None,
            false,
            false,
        );

        let report = aggregate_orders(&[shipowl, prepaid, postpaid], &HashMap::new());
        assert_eq!(report.shipowl.order_count, 1);
        assert_eq!(report.selfship_prepaid.order_count, 1);
        assert_eq!(report.selfship_postpaid.order_count, 1);
        assert_eq!(report.totals.order_count, 3);
    }

    #[test]
    fn sums_items_and_null_guards_costs() {
        let order = test_order(
            ShippingMethod::Shipowl,
            PaymentMode::Postpaid,
            Some(dec!(40)),
            Some(dec!(500)),
            true,
            false,
        );
        let mut items = HashMap::new();
        items.insert(
            order.id,
            vec![
                test_item(order.id, 2, Some(dec!(75))),
                // Legacy row without a cost snapshot counts as zero.
                test_item(order.id, 3, None),
            ],
        );

        let report = aggregate_orders(std::slice::from_ref(&order), &items);
        assert_eq!(report.shipowl.item_count, 5);
        assert_eq!(report.shipowl.product_cost, dec!(150));
        assert_eq!(report.shipowl.shipping_cost, dec!(40));
        assert_eq!(report.shipowl.cod_collected, dec!(500));
        // 500 COD - 150 product cost - 40 shipping
        assert_eq!(report.shipowl.remittance, dec!(310));
    }

    #[test]
    fn cod_only_counts_on_delivered_postpaid_orders() {
        let undelivered = test_order(
            ShippingMethod::Selfship,
            PaymentMode::Postpaid,
            Some(dec!(10)),
            Some(dec!(200)),
            false,
            false,
        );
        let prepaid_delivered = test_order(
            ShippingMethod::Selfship,
            PaymentMode::Prepaid,
            Some(dec!(10)),
            Some(dec!(200)),
            true,
            false,
        );

        let report = aggregate_orders(&[undelivered, prepaid_delivered], &HashMap::new());
        assert_eq!(report.selfship_postpaid.cod_collected, dec!(0));
        assert_eq!(report.selfship_prepaid.cod_collected, dec!(0));
        assert_eq!(report.selfship_prepaid.delivered_count, 1);
    }

    #[test]
    fn rto_orders_are_counted_but_collect_nothing() {
        let rto = test_order(
            ShippingMethod::Shipowl,
            PaymentMode::Postpaid,
            Some(dec!(30)),
            Some(dec!(400)),
            false,
            true,
        );

        let report = aggregate_orders(std::slice::from_ref(&rto), &HashMap::new());
        assert_eq!(report.shipowl.rto_count, 1);
        assert_eq!(report.shipowl.cod_collected, dec!(0));
        // Shipping was still spent; remittance goes negative.
        assert_eq!(report.shipowl.remittance, dec!(-30));
    }

    #[test]
    fn selfship_remittance_ignores_product_cost() {
        let order = test_order(
            ShippingMethod::Selfship,
            PaymentMode::Postpaid,
            Some(dec!(25)),
            Some(dec!(300)),
            true,
            false,
        );
        let mut items = HashMap::new();
        items.insert(order.id, vec![test_item(order.id, 1, Some(dec!(100)))]);

        let report = aggregate_orders(std::slice::from_ref(&order), &items);
        // Product cost is tracked for reporting but the supplier already
        // owns the goods, so it does not reduce remittance.
        assert_eq!(report.selfship_postpaid.product_cost, dec!(100));
        assert_eq!(report.selfship_postpaid.remittance, dec!(275));
    }

    #[test]
    fn totals_absorb_all_buckets() {
        let a = test_order(
            ShippingMethod::Shipowl,
            PaymentMode::Postpaid,
            Some(dec!(10)),
            Some(dec!(100)),
            true,
            false,
        );
        let b = test_order(
            ShippingMethod::Selfship,
            PaymentMode::Postpaid,
            Some(dec!(20)),
            Some(dec!(200)),
            true,
            false,
        );

        let report = aggregate_orders(&[a, b], &HashMap::new());
        assert_eq!(report.totals.order_count, 2);
        assert_eq!(report.totals.shipping_cost, dec!(30));
        assert_eq!(report.totals.cod_collected, dec!(300));
        assert_eq!(
            report.totals.remittance,
            report.shipowl.remittance + report.selfship_postpaid.remittance
        );
    }

    #[test]
    fn empty_input_is_all_zeroes() {
        let report = aggregate_orders(&[], &HashMap::new());
        assert_eq!(report.totals, ReportBucket::default());
    }
}
