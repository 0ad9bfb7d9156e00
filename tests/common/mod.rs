#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use shipowl_api::{
    config::AppConfig,
    couriers::{CourierClient, TrackingStatus, UnconfiguredCourier},
    db,
    entities::{admin, dropshipper, order, order_item, product, supplier},
    errors::ServiceError,
    handlers::AppServices,
    services::email::{EmailMessage, Mailer},
    services::uploads::UploadStore,
    AppState,
};
use tower::util::ServiceExt;
use uuid::Uuid;

/// Courier stub with a programmable AWB -> status table. Unknown AWBs fail
/// like a flaky upstream would.
#[derive(Default)]
pub struct MockCourier {
    statuses: Mutex<HashMap<String, TrackingStatus>>,
}

impl MockCourier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, awb: &str, raw_status: &str, timestamp: Option<DateTime<Utc>>) {
        let state = shipowl_api::couriers::map_courier_status(raw_status);
        self.statuses.lock().unwrap().insert(
            awb.to_string(),
            TrackingStatus {
                awb: awb.to_string(),
                state,
                raw_status: raw_status.to_string(),
                timestamp,
                remark: None,
            },
        );
    }
}

#[async_trait]
impl CourierClient for MockCourier {
    async fn track(&self, awb: &str) -> Result<TrackingStatus, ServiceError> {
        self.statuses
            .lock()
            .unwrap()
            .get(awb)
            .cloned()
            .ok_or_else(|| ServiceError::UpstreamError(format!("no tracking data for {awb}")))
    }
}

/// Mailer that records every message instead of delivering it.
#[derive(Default, Clone)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<EmailMessage>>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), ServiceError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Test harness: the full router over a fresh SQLite database with seeded
/// panel accounts.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub admin: admin::Model,
    pub supplier: supplier::Model,
    pub dropshipper: dropshipper::Model,
    pub mailer: RecordingMailer,
    _tmp: tempfile::TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_courier(Arc::new(UnconfiguredCourier)).await
    }

    pub async fn with_courier(courier: Arc<dyn CourierClient>) -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let db_path = tmp.path().join("shipowl_test.db");
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let mut cfg = AppConfig::new(database_url, "test");
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let mailer = RecordingMailer::default();
        let uploads = Arc::new(UploadStore::new(tmp.path().join("uploads"), 1024 * 1024));

        let services = AppServices::new(
            db_arc.clone(),
            courier,
            Arc::new(mailer.clone()),
            uploads,
        );
        services
            .roles
            .seed_permissions()
            .await
            .expect("seed permissions");

        let state = AppState {
            db: db_arc.clone(),
            config: cfg,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", shipowl_api::api_v1_routes())
            .with_state(state.clone());

        let now = Utc::now();
        let admin = admin::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Root Admin".to_string()),
            email: Set("admin@shipowl.test".to_string()),
            password_hash: Set("$argon2id$test".to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*db_arc)
        .await
        .expect("seed admin");

        let supplier = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Acme Traders".to_string()),
            email: Set("supplier@shipowl.test".to_string()),
            password_hash: Set("$argon2id$test".to_string()),
            phone: Set(Some("9876543210".to_string())),
            company_name: Set(Some("Acme Traders Pvt Ltd".to_string())),
            gst_number: Set(None),
            is_active: Set(true),
            is_verified: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*db_arc)
        .await
        .expect("seed supplier");

        let dropshipper = dropshipper::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Nova Store".to_string()),
            email: Set("dropshipper@shipowl.test".to_string()),
            password_hash: Set("$argon2id$test".to_string()),
            phone: Set(Some("9123456780".to_string())),
            store_name: Set(Some("Nova Store".to_string())),
            website: Set(None),
            is_active: Set(true),
            is_verified: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*db_arc)
        .await
        .expect("seed dropshipper");

        Self {
            router,
            state,
            admin,
            supplier,
            dropshipper,
            mailer,
            _tmp: tmp,
        }
    }

    pub fn admin_headers(&self) -> Vec<(String, String)> {
        vec![
            ("x-admin-id".to_string(), self.admin.id.to_string()),
            ("x-admin-role".to_string(), "admin".to_string()),
        ]
    }

    pub fn supplier_headers(&self) -> Vec<(String, String)> {
        vec![
            ("x-supplier-id".to_string(), self.supplier.id.to_string()),
            ("x-supplier-role".to_string(), "supplier".to_string()),
        ]
    }

    pub fn dropshipper_headers(&self) -> Vec<(String, String)> {
        vec![
            (
                "x-dropshipper-id".to_string(),
                self.dropshipper.id.to_string(),
            ),
            ("x-dropshipper-role".to_string(), "dropshipper".to_string()),
        ]
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        headers: &[(String, String)],
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router call failed")
    }

    /// Seeds a published product owned by the harness supplier.
    pub async fn seed_product(&self, sku: &str, price: Decimal, cost: Decimal) -> product::Model {
        let now = Utc::now();
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            supplier_id: Set(self.supplier.id),
            sku: Set(sku.to_string()),
            name: Set(format!("Product {sku}")),
            description: Set(None),
            category: Set(Some("general".to_string())),
            price: Set(price),
            cost_price: Set(cost),
            weight_grams: Set(Some(250)),
            image_path: Set(None),
            is_published: Set(true),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product")
    }

    /// Seeds an order with one item, bypassing the API, for report and
    /// tracking tests.
    #[allow(clippy::too_many_arguments)]
    pub async fn seed_order(&self, seed: OrderSeed) -> order::Model {
        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let order = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(format!("SO-TEST-{}", &order_id.simple().to_string()[..8])),
            dropshipper_id: Set(seed.dropshipper_id.unwrap_or(self.dropshipper.id)),
            supplier_id: Set(self.supplier.id),
            warehouse_id: Set(None),
            shipping_method: Set(seed.shipping_method.to_string()),
            payment_mode: Set(seed.payment_mode.to_string()),
            status: Set(seed.status.to_string()),
            courier_name: Set(seed.awb_number.is_some().then(|| "mockcourier".to_string())),
            awb_number: Set(seed.awb_number),
            shipping_cost: Set(seed.shipping_cost),
            cod_amount: Set(seed.cod_amount),
            total_amount: Set(seed.unit_price * Decimal::from(seed.quantity)),
            delivered: Set(seed.delivered),
            delivered_at: Set(seed.delivered.then(|| now)),
            rto: Set(seed.rto),
            rto_delivered: Set(false),
            rto_at: Set(None),
            last_tracking_status: Set(None),
            consignee_name: Set("Test Consignee".to_string()),
            consignee_phone: Set("9999999999".to_string()),
            consignee_address: Set("42 Test Lane".to_string()),
            consignee_city: Set("Indore".to_string()),
            consignee_state: Set("MP".to_string()),
            consignee_pincode: Set("452001".to_string()),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed order");

        order_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(Uuid::new_v4()),
            sku: Set("SEED-SKU".to_string()),
            name: Set("Seeded Product".to_string()),
            quantity: Set(seed.quantity),
            unit_price: Set(seed.unit_price),
            product_cost: Set(seed.product_cost),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed order item");

        order
    }
}

/// Input for `TestApp::seed_order` with sensible defaults.
pub struct OrderSeed {
    pub shipping_method: shipowl_api::entities::order::ShippingMethod,
    pub payment_mode: shipowl_api::entities::order::PaymentMode,
    pub status: shipowl_api::entities::order::OrderStatus,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub product_cost: Option<Decimal>,
    pub shipping_cost: Option<Decimal>,
    pub cod_amount: Option<Decimal>,
    pub delivered: bool,
    pub rto: bool,
    pub awb_number: Option<String>,
    pub dropshipper_id: Option<Uuid>,
}

impl Default for OrderSeed {
    fn default() -> Self {
        Self {
            shipping_method: shipowl_api::entities::order::ShippingMethod::Shipowl,
            payment_mode: shipowl_api::entities::order::PaymentMode::Postpaid,
            status: shipowl_api::entities::order::OrderStatus::Pending,
            quantity: 1,
            unit_price: Decimal::new(100, 0),
            product_cost: Some(Decimal::new(60, 0)),
            shipping_cost: Some(Decimal::new(10, 0)),
            cod_amount: Some(Decimal::new(110, 0)),
            delivered: false,
            rto: false,
            awb_number: None,
            dropshipper_id: None,
        }
    }
}

/// Collects a response body into JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse response body")
}
