use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{supplier, warehouse},
    errors::ServiceError,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWarehouseRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub address_line1: String,
    pub address_line2: Option<String>,
    #[validate(length(min = 1, max = 80))]
    pub city: String,
    #[validate(length(min = 1, max = 80))]
    pub state: String,
    #[validate(length(min = 4, max = 10))]
    pub postal_code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWarehouseRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

/// Warehouse row joined with its owning supplier, for the admin listing.
#[derive(Debug, Serialize)]
pub struct WarehouseWithSupplier {
    #[serde(flatten)]
    pub warehouse: warehouse::Model,
    pub supplier_name: Option<String>,
}

#[derive(Clone)]
pub struct WarehouseService {
    db_pool: Arc<DbPool>,
}

impl WarehouseService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    async fn scoped_warehouse(
        &self,
        supplier_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<warehouse::Model, ServiceError> {
        warehouse::Entity::find_by_id(warehouse_id)
            .filter(warehouse::Column::SupplierId.eq(supplier_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Warehouse {warehouse_id} not found")))
    }

    #[instrument(skip(self, request))]
    pub async fn create_warehouse(
        &self,
        supplier_id: Uuid,
        request: CreateWarehouseRequest,
    ) -> Result<warehouse::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let now = Utc::now();
        let model = warehouse::ActiveModel {
            id: Set(Uuid::new_v4()),
            supplier_id: Set(supplier_id),
            name: Set(request.name),
            contact_name: Set(request.contact_name),
            phone: Set(request.phone),
            address_line1: Set(request.address_line1),
            address_line2: Set(request.address_line2),
            city: Set(request.city),
            state: Set(request.state),
            postal_code: Set(request.postal_code),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(warehouse_id = %model.id, supplier_id = %supplier_id, "warehouse created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list_supplier_warehouses(
        &self,
        supplier_id: Uuid,
    ) -> Result<Vec<warehouse::Model>, ServiceError> {
        Ok(warehouse::Entity::find()
            .filter(warehouse::Column::SupplierId.eq(supplier_id))
            .order_by_desc(warehouse::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    /// Admin view across tenants, with the owning supplier's name.
    #[instrument(skip(self))]
    pub async fn list_all_warehouses(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<WarehouseWithSupplier>, u64), ServiceError> {
        let db = &*self.db_pool;
        let paginator = warehouse::Entity::find()
            .find_also_related(supplier::Entity)
            .order_by_desc(warehouse::Column::CreatedAt)
            .paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        let warehouses = rows
            .into_iter()
            .map(|(warehouse, supplier)| WarehouseWithSupplier {
                warehouse,
                supplier_name: supplier.map(|s| s.name),
            })
            .collect();
        Ok((warehouses, total))
    }

    #[instrument(skip(self, request))]
    pub async fn update_warehouse(
        &self,
        supplier_id: Uuid,
        warehouse_id: Uuid,
        request: UpdateWarehouseRequest,
    ) -> Result<warehouse::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let model = self.scoped_warehouse(supplier_id, warehouse_id).await?;
        let mut active: warehouse::ActiveModel = model.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if request.contact_name.is_some() {
            active.contact_name = Set(request.contact_name);
        }
        if request.phone.is_some() {
            active.phone = Set(request.phone);
        }
        if let Some(line1) = request.address_line1 {
            active.address_line1 = Set(line1);
        }
        if request.address_line2.is_some() {
            active.address_line2 = Set(request.address_line2);
        }
        if let Some(city) = request.city {
            active.city = Set(city);
        }
        if let Some(state) = request.state {
            active.state = Set(state);
        }
        if let Some(postal_code) = request.postal_code {
            active.postal_code = Set(postal_code);
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_warehouse_status(
        &self,
        supplier_id: Uuid,
        warehouse_id: Uuid,
        is_active: bool,
    ) -> Result<warehouse::Model, ServiceError> {
        let model = self.scoped_warehouse(supplier_id, warehouse_id).await?;
        let mut active: warehouse::ActiveModel = model.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db_pool).await?)
    }
}
