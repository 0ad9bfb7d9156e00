mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use sea_orm::EntityTrait;
use serde_json::json;

use common::{body_json, MockCourier, OrderSeed, TestApp};
use shipowl_api::entities::order::{self, OrderStatus, PaymentMode, ShippingMethod};

fn shipped_seed(awb: &str) -> OrderSeed {
    OrderSeed {
        shipping_method: ShippingMethod::Shipowl,
        payment_mode: PaymentMode::Postpaid,
        status: OrderStatus::Shipped,
        awb_number: Some(awb.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn refresh_updates_flags_and_counts_failures() {
    let courier = Arc::new(MockCourier::new());
    courier.set_status("AWB-DEL", "Delivered", None);
    courier.set_status("AWB-RTO", "RTO Initiated", None);
    // AWB-DEAD intentionally missing: the courier call fails.

    let app = TestApp::with_courier(courier.clone()).await;
    let delivered = app.seed_order(shipped_seed("AWB-DEL")).await;
    let rto = app.seed_order(shipped_seed("AWB-RTO")).await;
    let dead = app.seed_order(shipped_seed("AWB-DEAD")).await;
    // Pending order without an AWB is not polled at all.
    app.seed_order(OrderSeed::default()).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/shipping/refresh",
            &app.admin_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["checked"], 3);
    assert_eq!(body["data"]["updated"], 2);
    assert_eq!(body["data"]["failed"], 1);

    let reloaded = order::Entity::find_by_id(delivered.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, "delivered");
    assert!(reloaded.delivered);
    assert!(reloaded.delivered_at.is_some());
    assert_eq!(reloaded.last_tracking_status.as_deref(), Some("Delivered"));

    let reloaded = order::Entity::find_by_id(rto.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, "rto");
    assert!(reloaded.rto);
    assert!(!reloaded.rto_delivered);

    let reloaded = order::Entity::find_by_id(dead.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, "shipped");
    assert!(reloaded.last_tracking_status.is_none());
}

#[tokio::test]
async fn rto_orders_are_polled_until_returned() {
    let courier = Arc::new(MockCourier::new());
    courier.set_status("AWB-RTO", "RTO Initiated", None);

    let app = TestApp::with_courier(courier.clone()).await;
    let order_model = app.seed_order(shipped_seed("AWB-RTO")).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/shipping/refresh",
            &app.admin_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The return completes on a later poll.
    courier.set_status("AWB-RTO", "RTO Delivered", None);
    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/shipping/refresh",
            &app.admin_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["updated"], 1);

    let reloaded = order::Entity::find_by_id(order_model.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, "rto_delivered");
    assert!(reloaded.rto_delivered);
    assert!(reloaded.rto_at.is_some());

    // Terminal orders drop out of the next refresh entirely.
    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/shipping/refresh",
            &app.admin_headers(),
            None,
        )
        .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["checked"], 0);
}

#[tokio::test]
async fn in_transit_updates_only_the_status_text() {
    let courier = Arc::new(MockCourier::new());
    courier.set_status("AWB-T", "In Transit", None);

    let app = TestApp::with_courier(courier).await;
    let order_model = app.seed_order(shipped_seed("AWB-T")).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/shipping/refresh",
            &app.admin_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let reloaded = order::Entity::find_by_id(order_model.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, "shipped");
    assert!(!reloaded.delivered);
    assert_eq!(reloaded.last_tracking_status.as_deref(), Some("In Transit"));
}

#[tokio::test]
async fn single_order_tracking_endpoint() {
    let courier = Arc::new(MockCourier::new());
    courier.set_status("AWB-ONE", "Out for Delivery", None);

    let app = TestApp::with_courier(courier).await;
    let tracked = app.seed_order(shipped_seed("AWB-ONE")).await;
    let untracked = app.seed_order(OrderSeed::default()).await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/admin/orders/{}/tracking", tracked.id),
            &app.admin_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["state"], json!("out_for_delivery"));
    assert_eq!(body["data"]["awb"], json!("AWB-ONE"));

    // No AWB assigned yet.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/admin/orders/{}/tracking", untracked.id),
            &app.admin_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
