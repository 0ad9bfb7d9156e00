use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{perm, Panel},
    db::DbPool,
    entities::{permission, role, role_permission, staff},
    errors::ServiceError,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    pub panel: Panel,
    #[validate(length(min = 1, max = 80))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// A permission with its grant state for one role.
#[derive(Debug, Serialize)]
pub struct PermissionGrant {
    pub permission_id: Uuid,
    pub module: String,
    pub action: String,
    pub allowed: bool,
}

#[derive(Debug, Serialize)]
pub struct RoleDetail {
    pub role: role::Model,
    pub permissions: Vec<PermissionGrant>,
}

/// Role and permission catalogue management.
#[derive(Clone)]
pub struct RoleService {
    db_pool: Arc<DbPool>,
}

impl RoleService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Inserts any catalogue permissions missing from the database.
    /// Idempotent; invoked on startup after migrations.
    #[instrument(skip(self))]
    pub async fn seed_permissions(&self) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = permission::Entity::find().all(db).await?;
        for &(module, action) in perm::ALL {
            if existing
                .iter()
                .any(|p| p.module == module && p.action == action)
            {
                continue;
            }
            permission::ActiveModel {
                id: Set(Uuid::new_v4()),
                module: Set(module.to_string()),
                action: Set(action.to_string()),
                description: Set(None),
            }
            .insert(db)
            .await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_roles(
        &self,
        panel: Option<Panel>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<role::Model>, u64), ServiceError> {
        let mut query = role::Entity::find();
        if let Some(panel) = panel {
            query = query.filter(role::Column::Panel.eq(panel.to_string()));
        }
        let paginator = query
            .order_by_desc(role::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let roles = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((roles, total))
    }

    #[instrument(skip(self, request))]
    pub async fn create_role(&self, request: CreateRoleRequest) -> Result<role::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let now = Utc::now();
        let model = role::ActiveModel {
            id: Set(Uuid::new_v4()),
            panel: Set(request.panel.to_string()),
            name: Set(request.name),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(role_id = %model.id, panel = %request.panel, "role created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_role_detail(&self, role_id: Uuid) -> Result<RoleDetail, ServiceError> {
        let db = &*self.db_pool;
        let role = role::Entity::find_by_id(role_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Role {role_id} not found")))?;

        let grants = role_permission::Entity::find()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .all(db)
            .await?;
        let catalogue = permission::Entity::find().all(db).await?;

        let permissions = catalogue
            .into_iter()
            .map(|p| {
                let allowed = grants
                    .iter()
                    .find(|g| g.permission_id == p.id)
                    .map(|g| g.allowed)
                    .unwrap_or(false);
                PermissionGrant {
                    permission_id: p.id,
                    module: p.module,
                    action: p.action,
                    allowed,
                }
            })
            .collect();

        Ok(RoleDetail { role, permissions })
    }

    #[instrument(skip(self, request))]
    pub async fn update_role(
        &self,
        role_id: Uuid,
        request: UpdateRoleRequest,
    ) -> Result<role::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let model = role::Entity::find_by_id(role_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Role {role_id} not found")))?;

        let mut active: role::ActiveModel = model.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_role(&self, role_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let model = role::Entity::find_by_id(role_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Role {role_id} not found")))?;

        let assigned = staff::Entity::find()
            .filter(staff::Column::RoleId.eq(role_id))
            .count(db)
            .await?;
        if assigned > 0 {
            return Err(ServiceError::Conflict(format!(
                "Role is assigned to {assigned} staff account(s)"
            )));
        }

        // Grants go with the role.
        role_permission::Entity::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .exec(db)
            .await?;
        model.delete(db).await?;
        info!(role_id = %role_id, "role deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_permissions(&self) -> Result<Vec<permission::Model>, ServiceError> {
        Ok(permission::Entity::find()
            .order_by_asc(permission::Column::Module)
            .all(&*self.db_pool)
            .await?)
    }

    /// Upserts the grant row for (role, permission).
    #[instrument(skip(self))]
    pub async fn set_permission(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
        allowed: bool,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        role::Entity::find_by_id(role_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Role {role_id} not found")))?;
        permission::Entity::find_by_id(permission_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Permission {permission_id} not found"))
            })?;

        let existing = role_permission::Entity::find()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .filter(role_permission::Column::PermissionId.eq(permission_id))
            .one(db)
            .await?;

        match existing {
            Some(grant) => {
                let mut active: role_permission::ActiveModel = grant.into();
                active.allowed = Set(allowed);
                active.update(db).await?;
            }
            None => {
                role_permission::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    role_id: Set(role_id),
                    permission_id: Set(permission_id),
                    allowed: Set(allowed),
                }
                .insert(db)
                .await?;
            }
        }

        info!(role_id = %role_id, permission_id = %permission_id, allowed, "permission grant updated");
        Ok(())
    }
}
