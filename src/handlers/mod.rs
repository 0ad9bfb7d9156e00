pub mod accounts;
pub mod common;
pub mod email_configs;
pub mod health;
pub mod orders;
pub mod products;
pub mod reports;
pub mod roles;
pub mod shipping;
pub mod staff;
pub mod warehouses;

use std::sync::Arc;

use crate::couriers::CourierClient;
use crate::db::DbPool;
use crate::services::email::Mailer;
use crate::services::uploads::UploadStore;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub accounts: Arc<crate::services::accounts::AccountService>,
    pub staff: Arc<crate::services::staff::StaffService>,
    pub roles: Arc<crate::services::roles::RoleService>,
    pub products: Arc<crate::services::products::ProductService>,
    pub warehouses: Arc<crate::services::warehouses::WarehouseService>,
    pub orders: Arc<crate::services::orders::OrderService>,
    pub reports: Arc<crate::services::reports::ReportService>,
    pub shipping: Arc<crate::services::shipping::ShippingService>,
    pub email: Arc<crate::services::email::EmailService>,
    pub uploads: Arc<UploadStore>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        courier: Arc<dyn CourierClient>,
        mailer: Arc<dyn Mailer>,
        uploads: Arc<UploadStore>,
    ) -> Self {
        Self {
            accounts: Arc::new(crate::services::accounts::AccountService::new(
                db_pool.clone(),
            )),
            staff: Arc::new(crate::services::staff::StaffService::new(db_pool.clone())),
            roles: Arc::new(crate::services::roles::RoleService::new(db_pool.clone())),
            products: Arc::new(crate::services::products::ProductService::new(
                db_pool.clone(),
            )),
            warehouses: Arc::new(crate::services::warehouses::WarehouseService::new(
                db_pool.clone(),
            )),
            orders: Arc::new(crate::services::orders::OrderService::new(db_pool.clone())),
            reports: Arc::new(crate::services::reports::ReportService::new(
                db_pool.clone(),
            )),
            shipping: Arc::new(crate::services::shipping::ShippingService::new(
                db_pool.clone(),
                courier,
            )),
            email: Arc::new(crate::services::email::EmailService::new(db_pool, mailer)),
            uploads,
        }
    }
}
