mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use common::{body_json, OrderSeed, TestApp};
use shipowl_api::entities::order::{OrderStatus, PaymentMode, ShippingMethod};

fn dec(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
        .parse()
        .unwrap()
}

async fn seed_report_fixture(app: &TestApp) {
    // Shipowl, postpaid, delivered: 2 items @ cost 60, shipping 10, COD 210.
    app.seed_order(OrderSeed {
        shipping_method: ShippingMethod::Shipowl,
        payment_mode: PaymentMode::Postpaid,
        status: OrderStatus::Delivered,
        quantity: 2,
        unit_price: Decimal::from(100),
        product_cost: Some(Decimal::from(60)),
        shipping_cost: Some(Decimal::from(10)),
        cod_amount: Some(Decimal::from(210)),
        delivered: true,
        ..Default::default()
    })
    .await;

    // Shipowl, postpaid, RTO in progress: COD not collected.
    app.seed_order(OrderSeed {
        shipping_method: ShippingMethod::Shipowl,
        payment_mode: PaymentMode::Postpaid,
        status: OrderStatus::Rto,
        quantity: 1,
        unit_price: Decimal::from(150),
        product_cost: Some(Decimal::from(60)),
        shipping_cost: Some(Decimal::from(10)),
        cod_amount: Some(Decimal::from(150)),
        rto: true,
        ..Default::default()
    })
    .await;

    // Selfship prepaid, delivered, no cost snapshot (legacy row).
    app.seed_order(OrderSeed {
        shipping_method: ShippingMethod::Selfship,
        payment_mode: PaymentMode::Prepaid,
        status: OrderStatus::Delivered,
        quantity: 1,
        unit_price: Decimal::from(80),
        product_cost: None,
        shipping_cost: Some(Decimal::from(15)),
        cod_amount: None,
        delivered: true,
        ..Default::default()
    })
    .await;

    // Selfship postpaid, delivered: COD 200, shipping 20.
    app.seed_order(OrderSeed {
        shipping_method: ShippingMethod::Selfship,
        payment_mode: PaymentMode::Postpaid,
        status: OrderStatus::Delivered,
        quantity: 3,
        unit_price: Decimal::from(60),
        product_cost: Some(Decimal::from(40)),
        shipping_cost: Some(Decimal::from(20)),
        cod_amount: Some(Decimal::from(200)),
        delivered: true,
        ..Default::default()
    })
    .await;
}

#[tokio::test]
async fn admin_report_buckets_and_sums() {
    let app = TestApp::new().await;
    seed_report_fixture(&app).await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/reports/orders",
            &app.admin_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let report = &body["data"];

    let shipowl = &report["shipowl"];
    assert_eq!(shipowl["order_count"], 2);
    assert_eq!(shipowl["item_count"], 3);
    assert_eq!(shipowl["delivered_count"], 1);
    assert_eq!(shipowl["rto_count"], 1);
    assert_eq!(dec(&shipowl["product_cost"]), Decimal::from(180));
    assert_eq!(dec(&shipowl["shipping_cost"]), Decimal::from(20));
    assert_eq!(dec(&shipowl["cod_collected"]), Decimal::from(210));
    // 210 - 180 - 20
    assert_eq!(dec(&shipowl["remittance"]), Decimal::from(10));

    let prepaid = &report["selfship_prepaid"];
    assert_eq!(prepaid["order_count"], 1);
    assert_eq!(dec(&prepaid["product_cost"]), Decimal::ZERO);
    assert_eq!(dec(&prepaid["cod_collected"]), Decimal::ZERO);
    assert_eq!(dec(&prepaid["remittance"]), Decimal::from(-15));

    let postpaid = &report["selfship_postpaid"];
    assert_eq!(postpaid["order_count"], 1);
    assert_eq!(dec(&postpaid["cod_collected"]), Decimal::from(200));
    assert_eq!(dec(&postpaid["product_cost"]), Decimal::from(120));
    // 200 - 20; selfship remittance ignores product cost.
    assert_eq!(dec(&postpaid["remittance"]), Decimal::from(180));

    let totals = &report["totals"];
    assert_eq!(totals["order_count"], 4);
    assert_eq!(totals["item_count"], 7);
    assert_eq!(dec(&totals["shipping_cost"]), Decimal::from(55));
    assert_eq!(dec(&totals["cod_collected"]), Decimal::from(410));
}

#[tokio::test]
async fn report_date_range_excludes_outside_orders() {
    let app = TestApp::new().await;
    seed_report_fixture(&app).await;

    let tomorrow = (Utc::now() + Duration::days(1)).format("%Y-%m-%d");
    let uri = format!("/api/v1/admin/reports/orders?from={tomorrow}");
    let response = app
        .request(Method::GET, &uri, &app.admin_headers(), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["totals"]["order_count"], 0);

    // Today is inside an inclusive from=today range.
    let today = Utc::now().format("%Y-%m-%d");
    let uri = format!("/api/v1/admin/reports/orders?from={today}&to={today}");
    let response = app
        .request(Method::GET, &uri, &app.admin_headers(), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["totals"]["order_count"], 4);
}

#[tokio::test]
async fn malformed_report_dates_are_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/reports/orders?from=01-04-2024",
            &app.admin_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dropshipper_report_is_tenant_scoped() {
    let app = TestApp::new().await;
    seed_report_fixture(&app).await;

    // An order belonging to someone else must not leak into the report.
    app.seed_order(OrderSeed {
        dropshipper_id: Some(uuid::Uuid::new_v4()),
        shipping_method: ShippingMethod::Shipowl,
        payment_mode: PaymentMode::Postpaid,
        status: OrderStatus::Delivered,
        delivered: true,
        ..Default::default()
    })
    .await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/dropshipper/reports/orders",
            &app.dropshipper_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["totals"]["order_count"], 4);

    // The admin view includes it.
    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/reports/orders",
            &app.admin_headers(),
            None,
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["totals"]["order_count"], 5);
}
