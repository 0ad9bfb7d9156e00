//! Panel identity and staff permissions.
//!
//! Identity arrives on custom headers set by the gateway: `x-admin-id`,
//! `x-supplier-id` or `x-dropshipper-id`, each paired with an
//! `x-<panel>-role` header. A role value of `staff` selects the staff
//! lookup path; anything else (or no role header) means the primary panel
//! account. Staff identities resolve to their parent account for data
//! scoping and carry the staff role for permission checks.

use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{
    entities::{admin, dropshipper, permission, role_permission, staff, supplier},
    errors::ApiError,
    AppState,
};

/// Permission catalogue used by `require_permission` and seeded at startup.
pub mod perm {
    pub type Perm = (&'static str, &'static str);

    pub const ACCOUNTS_VIEW: Perm = ("accounts", "view");
    pub const ACCOUNTS_MANAGE: Perm = ("accounts", "manage");
    pub const STAFF_MANAGE: Perm = ("staff", "manage");
    pub const ROLES_MANAGE: Perm = ("roles", "manage");
    pub const PRODUCTS_VIEW: Perm = ("products", "view");
    pub const PRODUCTS_MANAGE: Perm = ("products", "manage");
    pub const WAREHOUSES_VIEW: Perm = ("warehouses", "view");
    pub const WAREHOUSES_MANAGE: Perm = ("warehouses", "manage");
    pub const ORDERS_VIEW: Perm = ("orders", "view");
    pub const ORDERS_MANAGE: Perm = ("orders", "manage");
    pub const REPORTS_VIEW: Perm = ("reports", "view");
    pub const SHIPPING_MANAGE: Perm = ("shipping", "manage");
    pub const EMAIL_CONFIGS_MANAGE: Perm = ("email_configs", "manage");

    /// Every known permission, used to seed the `permissions` table.
    pub const ALL: &[Perm] = &[
        ACCOUNTS_VIEW,
        ACCOUNTS_MANAGE,
        STAFF_MANAGE,
        ROLES_MANAGE,
        PRODUCTS_VIEW,
        PRODUCTS_MANAGE,
        WAREHOUSES_VIEW,
        WAREHOUSES_MANAGE,
        ORDERS_VIEW,
        ORDERS_MANAGE,
        REPORTS_VIEW,
        SHIPPING_MANAGE,
        EMAIL_CONFIGS_MANAGE,
    ];
}

/// The three tenant panels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Admin,
    Supplier,
    Dropshipper,
}

impl Panel {
    pub fn id_header(self) -> &'static str {
        match self {
            Panel::Admin => "x-admin-id",
            Panel::Supplier => "x-supplier-id",
            Panel::Dropshipper => "x-dropshipper-id",
        }
    }

    pub fn role_header(self) -> &'static str {
        match self {
            Panel::Admin => "x-admin-role",
            Panel::Supplier => "x-supplier-role",
            Panel::Dropshipper => "x-dropshipper-role",
        }
    }
}

/// Resolved caller identity.
///
/// `account_id` is the panel account whose data the caller may touch: the
/// caller itself for primary accounts, the parent account for staff.
#[derive(Debug, Clone)]
pub struct Identity {
    pub panel: Panel,
    pub actor_id: Uuid,
    pub account_id: Uuid,
    pub staff_role_id: Option<Uuid>,
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn is_staff(&self) -> bool {
        self.staff_role_id.is_some()
    }
}

/// Shared behavior of the per-panel extractors, so handlers can be written
/// generically over the panel they serve.
pub trait PanelIdentity: Send + Sync + 'static {
    const PANEL: Panel;

    fn identity(&self) -> &Identity;

    fn account_id(&self) -> Uuid {
        self.identity().account_id
    }

    fn staff_role_id(&self) -> Option<Uuid> {
        self.identity().staff_role_id
    }
}

#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

#[derive(Debug, Clone)]
pub struct SupplierIdentity(pub Identity);

#[derive(Debug, Clone)]
pub struct DropshipperIdentity(pub Identity);

impl PanelIdentity for AdminIdentity {
    const PANEL: Panel = Panel::Admin;
    fn identity(&self) -> &Identity {
        &self.0
    }
}

impl PanelIdentity for SupplierIdentity {
    const PANEL: Panel = Panel::Supplier;
    fn identity(&self) -> &Identity {
        &self.0
    }
}

impl PanelIdentity for DropshipperIdentity {
    const PANEL: Panel = Panel::Dropshipper;
    fn identity(&self) -> &Identity {
        &self.0
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_identity(parts, state, Panel::Admin)
            .await
            .map(AdminIdentity)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for SupplierIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_identity(parts, state, Panel::Supplier)
            .await
            .map(SupplierIdentity)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for DropshipperIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_identity(parts, state, Panel::Dropshipper)
            .await
            .map(DropshipperIdentity)
    }
}

/// Looks the caller up in the panel (or staff) table.
async fn resolve_identity(
    parts: &Parts,
    state: &AppState,
    panel: Panel,
) -> Result<Identity, ApiError> {
    let id_header = panel.id_header();
    let raw_id = parts
        .headers
        .get(id_header)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {id_header} header")))?;

    let actor_id = Uuid::parse_str(raw_id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid {id_header} header")))?;

    let role = parts
        .headers
        .get(panel.role_header())
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let db = state.db.as_ref();

    if role.eq_ignore_ascii_case("staff") {
        let staff_row = staff::Entity::find_by_id(actor_id)
            .filter(staff::Column::Panel.eq(panel.to_string()))
            .filter(staff::Column::IsActive.eq(true))
            .one(db)
            .await
            .map_err(crate::errors::ServiceError::db_error)?
            .ok_or_else(|| ApiError::NotFound("Staff account not found".to_string()))?;

        // An inactive parent disables all of its staff.
        ensure_panel_account_active(db, panel, staff_row.parent_id).await?;

        return Ok(Identity {
            panel,
            actor_id,
            account_id: staff_row.parent_id,
            staff_role_id: Some(staff_row.role_id),
            name: staff_row.name,
            email: staff_row.email,
        });
    }

    let (name, email) = match panel {
        Panel::Admin => admin::Entity::find_by_id(actor_id)
            .filter(admin::Column::IsActive.eq(true))
            .one(db)
            .await
            .map_err(crate::errors::ServiceError::db_error)?
            .map(|m| (m.name, m.email))
            .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))?,
        Panel::Supplier => supplier::Entity::find_by_id(actor_id)
            .filter(supplier::Column::IsActive.eq(true))
            .one(db)
            .await
            .map_err(crate::errors::ServiceError::db_error)?
            .map(|m| (m.name, m.email))
            .ok_or_else(|| ApiError::NotFound("Supplier not found".to_string()))?,
        Panel::Dropshipper => dropshipper::Entity::find_by_id(actor_id)
            .filter(dropshipper::Column::IsActive.eq(true))
            .one(db)
            .await
            .map_err(crate::errors::ServiceError::db_error)?
            .map(|m| (m.name, m.email))
            .ok_or_else(|| ApiError::NotFound("Dropshipper not found".to_string()))?,
    };

    Ok(Identity {
        panel,
        actor_id,
        account_id: actor_id,
        staff_role_id: None,
        name,
        email,
    })
}

async fn ensure_panel_account_active(
    db: &sea_orm::DatabaseConnection,
    panel: Panel,
    account_id: Uuid,
) -> Result<(), ApiError> {
    let active = match panel {
        Panel::Admin => admin::Entity::find_by_id(account_id)
            .filter(admin::Column::IsActive.eq(true))
            .one(db)
            .await
            .map_err(crate::errors::ServiceError::db_error)?
            .is_some(),
        Panel::Supplier => supplier::Entity::find_by_id(account_id)
            .filter(supplier::Column::IsActive.eq(true))
            .one(db)
            .await
            .map_err(crate::errors::ServiceError::db_error)?
            .is_some(),
        Panel::Dropshipper => dropshipper::Entity::find_by_id(account_id)
            .filter(dropshipper::Column::IsActive.eq(true))
            .one(db)
            .await
            .map_err(crate::errors::ServiceError::db_error)?
            .is_some(),
    };

    if active {
        Ok(())
    } else {
        Err(ApiError::NotFound("Account not found".to_string()))
    }
}

/// Gate a staff caller on a (module, action) permission.
///
/// Primary accounts always pass. Staff pass only when their role carries an
/// `allowed` grant for the permission; missing grants and explicit
/// `allowed = false` rows both deny.
pub async fn require_permission<I: PanelIdentity>(
    state: &AppState,
    identity: &I,
    (module, action): perm::Perm,
) -> Result<(), ApiError> {
    let Some(role_id) = identity.staff_role_id() else {
        return Ok(());
    };

    let db = state.db.as_ref();

    let permission = permission::Entity::find()
        .filter(permission::Column::Module.eq(module))
        .filter(permission::Column::Action.eq(action))
        .one(db)
        .await
        .map_err(crate::errors::ServiceError::db_error)?;

    let allowed = match permission {
        Some(p) => role_permission::Entity::find()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .filter(role_permission::Column::PermissionId.eq(p.id))
            .one(db)
            .await
            .map_err(crate::errors::ServiceError::db_error)?
            .map(|grant| grant.allowed)
            .unwrap_or(false),
        None => false,
    };

    if allowed {
        Ok(())
    } else {
        tracing::debug!(
            role_id = %role_id,
            module,
            action,
            "staff permission denied"
        );
        Err(ApiError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn panel_headers() {
        assert_eq!(Panel::Admin.id_header(), "x-admin-id");
        assert_eq!(Panel::Supplier.role_header(), "x-supplier-role");
        assert_eq!(Panel::Dropshipper.id_header(), "x-dropshipper-id");
    }

    #[test]
    fn panel_round_trips_through_strings() {
        for panel in [Panel::Admin, Panel::Supplier, Panel::Dropshipper] {
            assert_eq!(Panel::from_str(&panel.to_string()).unwrap(), panel);
        }
    }
}
