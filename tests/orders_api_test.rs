mod common;

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;

use common::{body_json, TestApp};

fn consignee() -> serde_json::Value {
    json!({
        "consignee_name": "Ravi Kumar",
        "consignee_phone": "9876501234",
        "consignee_address": "12 MG Road",
        "consignee_city": "Pune",
        "consignee_state": "MH",
        "consignee_pincode": "411001",
    })
}

#[tokio::test]
async fn create_order_snapshots_items_and_totals() {
    let app = TestApp::new().await;
    let p1 = app
        .seed_product("SKU-1", Decimal::from(50), Decimal::from(30))
        .await;
    let p2 = app
        .seed_product("SKU-2", Decimal::from(20), Decimal::from(12))
        .await;

    let mut payload = consignee();
    payload["shipping_method"] = json!("selfship");
    payload["payment_mode"] = json!("postpaid");
    payload["cod_amount"] = json!("140");
    payload["items"] = json!([
        { "product_id": p1.id, "quantity": 2 },
        { "product_id": p2.id, "quantity": 1 },
    ]);

    let response = app
        .request(
            Method::POST,
            "/api/v1/dropshipper/orders",
            &app.dropshipper_headers(),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["status"], json!("pending"));
    assert!(data["order_number"].as_str().unwrap().starts_with("SO-"));

    let total: Decimal = data["total_amount"].as_str().unwrap().parse().unwrap();
    assert_eq!(total, Decimal::from(120));

    let items = data["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let snap1 = items.iter().find(|i| i["sku"] == "SKU-1").unwrap();
    let cost: Decimal = snap1["product_cost"].as_str().unwrap().parse().unwrap();
    assert_eq!(cost, Decimal::from(30));
}

#[tokio::test]
async fn postpaid_orders_require_cod_amount() {
    let app = TestApp::new().await;
    let p1 = app
        .seed_product("SKU-1", Decimal::from(50), Decimal::from(30))
        .await;

    let mut payload = consignee();
    payload["shipping_method"] = json!("shipowl");
    payload["payment_mode"] = json!("postpaid");
    payload["items"] = json!([{ "product_id": p1.id, "quantity": 1 }]);

    let response = app
        .request(
            Method::POST,
            "/api/v1/dropshipper/orders",
            &app.dropshipper_headers(),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_products_are_rejected() {
    let app = TestApp::new().await;

    let mut payload = consignee();
    payload["shipping_method"] = json!("shipowl");
    payload["payment_mode"] = json!("prepaid");
    payload["items"] = json!([{ "product_id": uuid::Uuid::new_v4(), "quantity": 1 }]);

    let response = app
        .request(
            Method::POST,
            "/api/v1/dropshipper/orders",
            &app.dropshipper_headers(),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unpublished_products_are_not_orderable() {
    let app = TestApp::new().await;
    let product = app
        .seed_product("SKU-HIDDEN", Decimal::from(50), Decimal::from(30))
        .await;

    // Unpublish through the supplier panel first.
    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/supplier/products/{}/publish", product.id),
            &app.supplier_headers(),
            Some(json!({ "is_published": false })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut payload = consignee();
    payload["shipping_method"] = json!("shipowl");
    payload["payment_mode"] = json!("prepaid");
    payload["items"] = json!([{ "product_id": product.id, "quantity": 1 }]);

    let response = app
        .request(
            Method::POST,
            "/api/v1/dropshipper/orders",
            &app.dropshipper_headers(),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn place_order(app: &TestApp) -> String {
    let p1 = app
        .seed_product(
            &format!("SKU-{}", uuid::Uuid::new_v4().simple()),
            Decimal::from(50),
            Decimal::from(30),
        )
        .await;
    let mut payload = consignee();
    payload["shipping_method"] = json!("shipowl");
    payload["payment_mode"] = json!("prepaid");
    payload["items"] = json!([{ "product_id": p1.id, "quantity": 1 }]);

    let response = app
        .request(
            Method::POST,
            "/api/v1/dropshipper/orders",
            &app.dropshipper_headers(),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn orders_are_visible_to_all_three_panels() {
    let app = TestApp::new().await;
    let order_id = place_order(&app).await;

    for (uri, headers) in [
        ("/api/v1/dropshipper/orders", app.dropshipper_headers()),
        ("/api/v1/supplier/orders", app.supplier_headers()),
        ("/api/v1/admin/orders", app.admin_headers()),
    ] {
        let response = app.request(Method::GET, uri, &headers, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1, "listing {uri}");
        assert_eq!(items[0]["id"], json!(order_id));
    }
}

#[tokio::test]
async fn dropshippers_cannot_see_foreign_orders() {
    let app = TestApp::new().await;
    app.seed_order(common::OrderSeed {
        dropshipper_id: Some(uuid::Uuid::new_v4()),
        ..Default::default()
    })
    .await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/dropshipper/orders",
            &app.dropshipper_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn status_machine_gates_admin_transitions() {
    let app = TestApp::new().await;
    let order_id = place_order(&app).await;
    let status_uri = format!("/api/v1/admin/orders/{order_id}/status");

    // pending -> delivered is illegal.
    let response = app
        .request(
            Method::PUT,
            &status_uri,
            &app.admin_headers(),
            Some(json!({ "status": "delivered" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // pending -> confirmed -> packed is legal.
    for status in ["confirmed", "packed"] {
        let response = app
            .request(
                Method::PUT,
                &status_uri,
                &app.admin_headers(),
                Some(json!({ "status": status })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "transition to {status}");
    }

    // Assigning a courier ships the order.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/admin/orders/{order_id}/assign-courier"),
            &app.admin_headers(),
            Some(json!({ "courier_name": "bluedart", "awb_number": "AWB-42" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], json!("shipped"));
    assert_eq!(body["data"]["awb_number"], json!("AWB-42"));

    // Shipped orders can no longer be cancelled.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/admin/orders/{order_id}/cancel"),
            &app.admin_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn bad_status_filter_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/orders?status=bogus",
            &app.admin_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
