use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{db::DbPool, entities::product, errors::ServiceError};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Decimal,
    pub cost_price: Decimal,
    pub weight_grams: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub weight_grams: Option<i32>,
}

#[derive(Debug, Default)]
pub struct CatalogFilter<'a> {
    pub search: Option<&'a str>,
    pub category: Option<&'a str>,
}

/// Supplier catalog management and the dropshipper-facing browse view.
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    async fn scoped_product(
        &self,
        supplier_id: Uuid,
        product_id: Uuid,
    ) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(product_id)
            .filter(product::Column::SupplierId.eq(supplier_id))
            .filter(product::Column::IsActive.eq(true))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {product_id} not found")))
    }

    #[instrument(skip(self, request), fields(sku = %request.sku))]
    pub async fn create_product(
        &self,
        supplier_id: Uuid,
        request: CreateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if request.price < Decimal::ZERO || request.cost_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Prices must not be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let duplicate = product::Entity::find()
            .filter(product::Column::SupplierId.eq(supplier_id))
            .filter(product::Column::Sku.eq(request.sku.clone()))
            .one(db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "SKU {} already exists for this supplier",
                request.sku
            )));
        }

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            supplier_id: Set(supplier_id),
            sku: Set(request.sku),
            name: Set(request.name),
            description: Set(request.description),
            category: Set(request.category),
            price: Set(request.price),
            cost_price: Set(request.cost_price),
            weight_grams: Set(request.weight_grams),
            image_path: Set(None),
            is_published: Set(false),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(db)
        .await?;

        info!(product_id = %model.id, supplier_id = %supplier_id, "product created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_product(
        &self,
        supplier_id: Uuid,
        product_id: Uuid,
    ) -> Result<product::Model, ServiceError> {
        self.scoped_product(supplier_id, product_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_supplier_products(
        &self,
        supplier_id: Uuid,
        page: u64,
        per_page: u64,
        search: Option<&str>,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let mut query = product::Entity::find()
            .filter(product::Column::SupplierId.eq(supplier_id))
            .filter(product::Column::IsActive.eq(true));
        if let Some(term) = search.filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query = query.filter(
                Condition::any()
                    .add(product::Column::Name.like(pattern.clone()))
                    .add(product::Column::Sku.like(pattern)),
            );
        }
        let paginator = query
            .order_by_desc(product::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((products, total))
    }

    /// Dropshipper-facing catalog: published, active products across all
    /// suppliers.
    #[instrument(skip(self, filter))]
    pub async fn browse_catalog(
        &self,
        filter: CatalogFilter<'_>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let mut query = product::Entity::find()
            .filter(product::Column::IsPublished.eq(true))
            .filter(product::Column::IsActive.eq(true));
        if let Some(term) = filter.search.filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query = query.filter(
                Condition::any()
                    .add(product::Column::Name.like(pattern.clone()))
                    .add(product::Column::Sku.like(pattern)),
            );
        }
        if let Some(category) = filter.category.filter(|c| !c.is_empty()) {
            query = query.filter(product::Column::Category.eq(category));
        }
        let paginator = query
            .order_by_desc(product::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page.max(1));
        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((products, total))
    }

    #[instrument(skip(self, request))]
    pub async fn update_product(
        &self,
        supplier_id: Uuid,
        product_id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let model = self.scoped_product(supplier_id, product_id).await?;
        let mut active: product::ActiveModel = model.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if request.description.is_some() {
            active.description = Set(request.description);
        }
        if request.category.is_some() {
            active.category = Set(request.category);
        }
        if let Some(price) = request.price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Prices must not be negative".to_string(),
                ));
            }
            active.price = Set(price);
        }
        if let Some(cost_price) = request.cost_price {
            if cost_price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Prices must not be negative".to_string(),
                ));
            }
            active.cost_price = Set(cost_price);
        }
        if request.weight_grams.is_some() {
            active.weight_grams = Set(request.weight_grams);
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_published(
        &self,
        supplier_id: Uuid,
        product_id: Uuid,
        is_published: bool,
    ) -> Result<product::Model, ServiceError> {
        let model = self.scoped_product(supplier_id, product_id).await?;
        let mut active: product::ActiveModel = model.into();
        active.is_published = Set(is_published);
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db_pool).await?)
    }

    /// Records the stored image path and returns the previous one, so the
    /// handler can clean up the replaced file.
    #[instrument(skip(self))]
    pub async fn attach_image(
        &self,
        supplier_id: Uuid,
        product_id: Uuid,
        image_path: String,
    ) -> Result<Option<String>, ServiceError> {
        let model = self.scoped_product(supplier_id, product_id).await?;
        let previous = model.image_path.clone();
        let mut active: product::ActiveModel = model.into();
        active.image_path = Set(Some(image_path));
        active.updated_at = Set(Some(Utc::now()));
        active.update(&*self.db_pool).await?;
        Ok(previous)
    }

    /// Soft delete: the product disappears from listings but existing order
    /// item snapshots keep referencing it.
    #[instrument(skip(self))]
    pub async fn delete_product(
        &self,
        supplier_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), ServiceError> {
        let model = self.scoped_product(supplier_id, product_id).await?;
        let mut active: product::ActiveModel = model.into();
        active.is_active = Set(false);
        active.is_published = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&*self.db_pool).await?;
        info!(product_id = %product_id, "product deactivated");
        Ok(())
    }
}
