mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{body_json, TestApp};

#[tokio::test]
async fn missing_identity_header_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/admin/orders", &[], None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("x-admin-id"));
}

#[tokio::test]
async fn malformed_identity_header_is_rejected() {
    let app = TestApp::new().await;

    let headers = vec![("x-admin-id".to_string(), "not-a-uuid".to_string())];
    let response = app
        .request(Method::GET, "/api/v1/admin/orders", &headers, None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_account_is_not_found() {
    let app = TestApp::new().await;

    let headers = vec![(
        "x-admin-id".to_string(),
        uuid::Uuid::new_v4().to_string(),
    )];
    let response = app
        .request(Method::GET, "/api/v1/admin/orders", &headers, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn panel_headers_do_not_cross_panels() {
    let app = TestApp::new().await;

    // A valid supplier identity is useless on the admin panel.
    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/orders",
            &app.supplier_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn primary_accounts_bypass_permission_checks() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/orders",
            &app.admin_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn create_role_and_staff(app: &TestApp) -> (String, String) {
    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/roles",
            &app.admin_headers(),
            Some(json!({ "panel": "admin", "name": "support" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let role = body_json(response).await;
    let role_id = role["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/staff",
            &app.admin_headers(),
            Some(json!({
                "name": "Support Staff",
                "email": "support@shipowl.test",
                "password": "supersecret1",
                "role_id": role_id,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let staff = body_json(response).await;
    let staff_id = staff["data"]["id"].as_str().unwrap().to_string();

    (role_id, staff_id)
}

async fn permission_id(app: &TestApp, module: &str, action: &str) -> String {
    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/permissions",
            &app.admin_headers(),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["module"] == module && p["action"] == action)
        .unwrap_or_else(|| panic!("permission {module}:{action} not seeded"))["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn staff_permission_grants_gate_access() {
    let app = TestApp::new().await;
    let (role_id, staff_id) = create_role_and_staff(&app).await;

    let staff_headers = vec![
        ("x-admin-id".to_string(), staff_id.clone()),
        ("x-admin-role".to_string(), "staff".to_string()),
    ];

    // No grant yet: denied.
    let response = app
        .request(Method::GET, "/api/v1/admin/orders", &staff_headers, None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        json!("You do not have permission to perform this action")
    );

    // Grant orders:view.
    let orders_view = permission_id(&app, "orders", "view").await;
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/roles/{role_id}/permissions"),
            &app.admin_headers(),
            Some(json!({ "permission_id": orders_view, "allowed": true })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api/v1/admin/orders", &staff_headers, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // An explicit allowed=false row is a denial again.
    let orders_view = permission_id(&app, "orders", "view").await;
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/roles/{role_id}/permissions"),
            &app.admin_headers(),
            Some(json!({ "permission_id": orders_view, "allowed": false })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api/v1/admin/orders", &staff_headers, None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deactivated_staff_cannot_authenticate() {
    let app = TestApp::new().await;
    let (_role_id, staff_id) = create_role_and_staff(&app).await;

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/admin/staff/{staff_id}/status"),
            &app.admin_headers(),
            Some(json!({ "is_active": false })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let staff_headers = vec![
        ("x-admin-id".to_string(), staff_id),
        ("x-admin-role".to_string(), "staff".to_string()),
    ];
    let response = app
        .request(Method::GET, "/api/v1/admin/orders", &staff_headers, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_from_another_panel_is_rejected_for_staff() {
    let app = TestApp::new().await;

    // A supplier-panel role cannot be attached to admin staff.
    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/roles",
            &app.admin_headers(),
            Some(json!({ "panel": "supplier", "name": "warehouse-ops" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let role = body_json(response).await;
    let role_id = role["data"]["id"].as_str().unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/staff",
            &app.admin_headers(),
            Some(json!({
                "name": "Mismatched",
                "email": "mismatch@shipowl.test",
                "password": "supersecret1",
                "role_id": role_id,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_account_email_conflicts() {
    let app = TestApp::new().await;

    let payload = json!({
        "name": "Second Supplier",
        "email": "supplier@shipowl.test",
        "password": "supersecret1",
    });
    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/suppliers",
            &app.admin_headers(),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
