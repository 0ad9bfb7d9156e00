use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::Panel,
    db::DbPool,
    entities::{role, staff},
    errors::ServiceError,
    services::accounts::hash_password,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStaffRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStaffRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub role_id: Option<Uuid>,
}

/// Staff sub-accounts, scoped to a (panel, parent account) pair.
#[derive(Clone)]
pub struct StaffService {
    db_pool: Arc<DbPool>,
}

impl StaffService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Role lookup that enforces the panel boundary: a supplier role can
    /// never be attached to admin staff.
    async fn panel_role(&self, panel: Panel, role_id: Uuid) -> Result<role::Model, ServiceError> {
        role::Entity::find_by_id(role_id)
            .filter(role::Column::Panel.eq(panel.to_string()))
            .filter(role::Column::IsActive.eq(true))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Role {role_id} not found")))
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_staff(
        &self,
        panel: Panel,
        parent_id: Uuid,
        request: CreateStaffRequest,
    ) -> Result<staff::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        self.panel_role(panel, request.role_id).await?;

        let db = &*self.db_pool;
        let exists = staff::Entity::find()
            .filter(staff::Column::Email.eq(request.email.clone()))
            .one(db)
            .await?;
        if exists.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Staff with email {} already exists",
                request.email
            )));
        }

        let now = Utc::now();
        let model = staff::ActiveModel {
            id: Set(Uuid::new_v4()),
            panel: Set(panel.to_string()),
            parent_id: Set(parent_id),
            role_id: Set(request.role_id),
            name: Set(request.name),
            email: Set(request.email),
            password_hash: Set(hash_password(&request.password)?),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(db)
        .await?;

        info!(staff_id = %model.id, panel = %panel, "staff account created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list_staff(
        &self,
        panel: Panel,
        parent_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<staff::Model>, u64), ServiceError> {
        let paginator = staff::Entity::find()
            .filter(staff::Column::Panel.eq(panel.to_string()))
            .filter(staff::Column::ParentId.eq(parent_id))
            .order_by_desc(staff::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let staff = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((staff, total))
    }

    /// Staff row scoped to its owning account; crossing tenants is a 404,
    /// not a 403, so tenants cannot probe each other's staff ids.
    async fn scoped_staff(
        &self,
        panel: Panel,
        parent_id: Uuid,
        staff_id: Uuid,
    ) -> Result<staff::Model, ServiceError> {
        staff::Entity::find_by_id(staff_id)
            .filter(staff::Column::Panel.eq(panel.to_string()))
            .filter(staff::Column::ParentId.eq(parent_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Staff {staff_id} not found")))
    }

    #[instrument(skip(self, request))]
    pub async fn update_staff(
        &self,
        panel: Panel,
        parent_id: Uuid,
        staff_id: Uuid,
        request: UpdateStaffRequest,
    ) -> Result<staff::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let model = self.scoped_staff(panel, parent_id, staff_id).await?;

        if let Some(role_id) = request.role_id {
            self.panel_role(panel, role_id).await?;
        }

        let mut active: staff::ActiveModel = model.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(role_id) = request.role_id {
            active.role_id = Set(role_id);
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_staff_status(
        &self,
        panel: Panel,
        parent_id: Uuid,
        staff_id: Uuid,
        is_active: bool,
    ) -> Result<staff::Model, ServiceError> {
        let model = self.scoped_staff(panel, parent_id, staff_id).await?;
        let mut active: staff::ActiveModel = model.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_staff(
        &self,
        panel: Panel,
        parent_id: Uuid,
        staff_id: Uuid,
    ) -> Result<(), ServiceError> {
        let model = self.scoped_staff(panel, parent_id, staff_id).await?;
        model.delete(&*self.db_pool).await?;
        info!(staff_id = %staff_id, "staff account deleted");
        Ok(())
    }
}
