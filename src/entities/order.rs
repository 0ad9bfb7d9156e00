use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Dropshipper order routed to a supplier warehouse.
///
/// Status, shipping method and payment mode are stored as strings and
/// parsed through the strum enums below at the service boundary.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_number: String,
    pub dropshipper_id: Uuid,
    pub supplier_id: Uuid,
    pub warehouse_id: Option<Uuid>,
    pub shipping_method: String,
    pub payment_mode: String,
    pub status: String,
    pub courier_name: Option<String>,
    pub awb_number: Option<String>,
    pub shipping_cost: Option<Decimal>,
    pub cod_amount: Option<Decimal>,
    pub total_amount: Decimal,
    pub delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub rto: bool,
    pub rto_delivered: bool,
    pub rto_at: Option<DateTime<Utc>>,
    pub last_tracking_status: Option<String>,
    pub consignee_name: String,
    pub consignee_phone: String,
    pub consignee_address: String,
    pub consignee_city: String,
    pub consignee_state: String,
    pub consignee_pincode: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(
        belongs_to = "super::dropshipper::Entity",
        from = "Column::DropshipperId",
        to = "super::dropshipper::Column::Id"
    )]
    Dropshipper,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::dropshipper::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dropshipper.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// How an order is fulfilled: by the platform (shipowl) or by the supplier
/// directly (selfship).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    Shipowl,
    Selfship,
}

/// Payment collection mode. Postpaid means cash on delivery.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Prepaid,
    Postpaid,
}

/// Order lifecycle states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
    Rto,
    RtoDelivered,
}

impl OrderStatus {
    /// Whether `self -> next` is a legal lifecycle transition.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Packed)
                | (Confirmed, Cancelled)
                | (Packed, Shipped)
                | (Shipped, Delivered)
                | (Shipped, Rto)
                | (Rto, RtoDelivered)
        )
    }

    /// States the tracking refresh still polls the courier for.
    pub fn is_trackable(self) -> bool {
        matches!(self, OrderStatus::Shipped | OrderStatus::Rto)
    }
}
