//! ShipOwl back-office API library
//!
//! Multi-tenant dropshipping back office: admin, supplier and dropshipper
//! panels over a shared order, catalog and remittance data model.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod couriers;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::{AdminIdentity, DropshipperIdentity, SupplierIdentity};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn message(message: String) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message),
            errors: None,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if total == 0 || per_page == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

/// Admin panel routes: tenant accounts, roles, cross-tenant orders,
/// reports, shipping refresh and email templates.
fn admin_routes() -> Router<AppState> {
    Router::new()
        // Supplier accounts
        .route("/suppliers", get(handlers::accounts::list_suppliers))
        .route("/suppliers", post(handlers::accounts::create_supplier))
        .route("/suppliers/:id", get(handlers::accounts::get_supplier))
        .route("/suppliers/:id", put(handlers::accounts::update_supplier))
        .route(
            "/suppliers/:id/status",
            patch(handlers::accounts::set_supplier_status),
        )
        .route(
            "/suppliers/:id/verify",
            patch(handlers::accounts::set_supplier_verified),
        )
        // Dropshipper accounts
        .route("/dropshippers", get(handlers::accounts::list_dropshippers))
        .route("/dropshippers", post(handlers::accounts::create_dropshipper))
        .route("/dropshippers/:id", get(handlers::accounts::get_dropshipper))
        .route(
            "/dropshippers/:id",
            put(handlers::accounts::update_dropshipper),
        )
        .route(
            "/dropshippers/:id/status",
            patch(handlers::accounts::set_dropshipper_status),
        )
        .route(
            "/dropshippers/:id/verify",
            patch(handlers::accounts::set_dropshipper_verified),
        )
        // Admin staff
        .route("/staff", get(handlers::staff::list_staff::<AdminIdentity>))
        .route("/staff", post(handlers::staff::create_staff::<AdminIdentity>))
        .route(
            "/staff/:id",
            put(handlers::staff::update_staff::<AdminIdentity>),
        )
        .route(
            "/staff/:id/status",
            patch(handlers::staff::set_staff_status::<AdminIdentity>),
        )
        .route(
            "/staff/:id",
            delete(handlers::staff::delete_staff::<AdminIdentity>),
        )
        // Roles & permissions
        .route("/roles", get(handlers::roles::list_roles))
        .route("/roles", post(handlers::roles::create_role))
        .route("/roles/:id", get(handlers::roles::get_role))
        .route("/roles/:id", put(handlers::roles::update_role))
        .route("/roles/:id", delete(handlers::roles::delete_role))
        .route(
            "/roles/:id/permissions",
            put(handlers::roles::set_role_permission),
        )
        .route("/permissions", get(handlers::roles::list_permissions))
        // Warehouses across tenants
        .route("/warehouses", get(handlers::warehouses::list_all_warehouses))
        // Orders across tenants
        .route("/orders", get(handlers::orders::list_admin_orders))
        .route("/orders/:id", get(handlers::orders::get_admin_order))
        .route(
            "/orders/:id/status",
            put(handlers::orders::update_order_status),
        )
        .route(
            "/orders/:id/assign-courier",
            post(handlers::orders::assign_courier),
        )
        .route("/orders/:id/cancel", post(handlers::orders::cancel_order))
        .route("/orders/:id/tracking", get(handlers::shipping::track_order))
        // Reports & shipping
        .route("/reports/orders", get(handlers::reports::admin_order_report))
        .route("/shipping/refresh", post(handlers::shipping::refresh_tracking))
        // Email templates
        .route("/email-configs", get(handlers::email_configs::list_email_configs))
        .route("/email-configs", post(handlers::email_configs::upsert_email_config))
        .route(
            "/email-configs/:module",
            get(handlers::email_configs::get_email_config),
        )
        .route(
            "/email-configs/:module",
            delete(handlers::email_configs::delete_email_config),
        )
        .route(
            "/email-configs/:module/test",
            post(handlers::email_configs::test_send_email),
        )
}

/// Supplier panel routes: own profile, staff, catalog, warehouses and the
/// orders routed to this supplier.
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::accounts::supplier_profile))
        .route("/profile", put(handlers::accounts::update_supplier_profile))
        // Staff
        .route("/staff", get(handlers::staff::list_staff::<SupplierIdentity>))
        .route(
            "/staff",
            post(handlers::staff::create_staff::<SupplierIdentity>),
        )
        .route(
            "/staff/:id",
            put(handlers::staff::update_staff::<SupplierIdentity>),
        )
        .route(
            "/staff/:id/status",
            patch(handlers::staff::set_staff_status::<SupplierIdentity>),
        )
        .route(
            "/staff/:id",
            delete(handlers::staff::delete_staff::<SupplierIdentity>),
        )
        // Catalog
        .route("/products", get(handlers::products::list_products))
        .route("/products", post(handlers::products::create_product))
        .route("/products/:id", get(handlers::products::get_product))
        .route("/products/:id", put(handlers::products::update_product))
        .route(
            "/products/:id/publish",
            patch(handlers::products::set_product_published),
        )
        .route("/products/:id", delete(handlers::products::delete_product))
        .route(
            "/products/:id/image",
            post(handlers::products::upload_product_image),
        )
        // Warehouses
        .route("/warehouses", get(handlers::warehouses::list_warehouses))
        .route("/warehouses", post(handlers::warehouses::create_warehouse))
        .route("/warehouses/:id", put(handlers::warehouses::update_warehouse))
        .route(
            "/warehouses/:id/status",
            patch(handlers::warehouses::set_warehouse_status),
        )
        // Orders
        .route("/orders", get(handlers::orders::list_supplier_orders))
        .route("/orders/:id", get(handlers::orders::get_supplier_order))
        // Reports
        .route(
            "/reports/orders",
            get(handlers::reports::supplier_order_report),
        )
}

/// Dropshipper panel routes: own profile, staff, catalog browsing, order
/// placement and reports.
fn dropshipper_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::accounts::dropshipper_profile))
        .route(
            "/profile",
            put(handlers::accounts::update_dropshipper_profile),
        )
        // Staff
        .route(
            "/staff",
            get(handlers::staff::list_staff::<DropshipperIdentity>),
        )
        .route(
            "/staff",
            post(handlers::staff::create_staff::<DropshipperIdentity>),
        )
        .route(
            "/staff/:id",
            put(handlers::staff::update_staff::<DropshipperIdentity>),
        )
        .route(
            "/staff/:id/status",
            patch(handlers::staff::set_staff_status::<DropshipperIdentity>),
        )
        .route(
            "/staff/:id",
            delete(handlers::staff::delete_staff::<DropshipperIdentity>),
        )
        // Catalog
        .route("/products", get(handlers::products::browse_catalog))
        // Orders
        .route("/orders", get(handlers::orders::list_dropshipper_orders))
        .route("/orders", post(handlers::orders::create_order))
        .route("/orders/:id", get(handlers::orders::get_dropshipper_order))
        // Reports
        .route(
            "/reports/orders",
            get(handlers::reports::dropshipper_order_report),
        )
}

/// Full `/api/v1` surface.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::health::api_status))
        .route("/health", get(handlers::health::health_check))
        .nest("/admin", admin_routes())
        .nest("/supplier", supplier_routes())
        .nest("/dropshipper", dropshipper_routes())
}
