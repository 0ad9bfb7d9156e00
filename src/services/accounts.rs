use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHasher,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{dropshipper, supplier},
    errors::ServiceError,
};

/// Hashes a plaintext password with argon2id.
pub fn hash_password(plain: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::InternalError(format!("password hashing failed: {e}")))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierAccount {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub gst_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSupplierAccount {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub gst_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDropshipperAccount {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub phone: Option<String>,
    pub store_name: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDropshipperAccount {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub store_name: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountPage<T> {
    pub accounts: Vec<T>,
    pub total: u64,
}

/// Service for supplier and dropshipper tenant accounts.
#[derive(Clone)]
pub struct AccountService {
    db_pool: Arc<DbPool>,
}

impl AccountService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    // Suppliers

    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        page: u64,
        per_page: u64,
        search: Option<&str>,
    ) -> Result<AccountPage<supplier::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = supplier::Entity::find();
        if let Some(term) = search.filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query = query.filter(
                Condition::any()
                    .add(supplier::Column::Name.like(pattern.clone()))
                    .add(supplier::Column::Email.like(pattern)),
            );
        }
        let paginator = query
            .order_by_desc(supplier::Column::CreatedAt)
            .paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let accounts = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok(AccountPage { accounts, total })
    }

    #[instrument(skip(self))]
    pub async fn get_supplier(&self, id: Uuid) -> Result<Option<supplier::Model>, ServiceError> {
        Ok(supplier::Entity::find_by_id(id).one(&*self.db_pool).await?)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_supplier(
        &self,
        request: CreateSupplierAccount,
    ) -> Result<supplier::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let exists = supplier::Entity::find()
            .filter(supplier::Column::Email.eq(request.email.clone()))
            .one(db)
            .await?;
        if exists.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Supplier with email {} already exists",
                request.email
            )));
        }

        let now = Utc::now();
        let model = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            email: Set(request.email),
            password_hash: Set(hash_password(&request.password)?),
            phone: Set(request.phone),
            company_name: Set(request.company_name),
            gst_number: Set(request.gst_number),
            is_active: Set(true),
            is_verified: Set(false),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(db)
        .await?;

        info!(supplier_id = %model.id, "supplier account created");
        Ok(model)
    }

    #[instrument(skip(self, request))]
    pub async fn update_supplier(
        &self,
        id: Uuid,
        request: UpdateSupplierAccount,
    ) -> Result<supplier::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let model = supplier::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {id} not found")))?;

        let mut active: supplier::ActiveModel = model.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if request.phone.is_some() {
            active.phone = Set(request.phone);
        }
        if request.company_name.is_some() {
            active.company_name = Set(request.company_name);
        }
        if request.gst_number.is_some() {
            active.gst_number = Set(request.gst_number);
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_supplier_status(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> Result<supplier::Model, ServiceError> {
        let db = &*self.db_pool;
        let model = supplier::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {id} not found")))?;
        let mut active: supplier::ActiveModel = model.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_supplier_verified(
        &self,
        id: Uuid,
        is_verified: bool,
    ) -> Result<supplier::Model, ServiceError> {
        let db = &*self.db_pool;
        let model = supplier::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {id} not found")))?;
        let mut active: supplier::ActiveModel = model.into();
        active.is_verified = Set(is_verified);
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(db).await?)
    }

    // Dropshippers

    #[instrument(skip(self))]
    pub async fn list_dropshippers(
        &self,
        page: u64,
        per_page: u64,
        search: Option<&str>,
    ) -> Result<AccountPage<dropshipper::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = dropshipper::Entity::find();
        if let Some(term) = search.filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query = query.filter(
                Condition::any()
                    .add(dropshipper::Column::Name.like(pattern.clone()))
                    .add(dropshipper::Column::Email.like(pattern)),
            );
        }
        let paginator = query
            .order_by_desc(dropshipper::Column::CreatedAt)
            .paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let accounts = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok(AccountPage { accounts, total })
    }

    #[instrument(skip(self))]
    pub async fn get_dropshipper(
        &self,
        id: Uuid,
    ) -> Result<Option<dropshipper::Model>, ServiceError> {
        Ok(dropshipper::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_dropshipper(
        &self,
        request: CreateDropshipperAccount,
    ) -> Result<dropshipper::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let exists = dropshipper::Entity::find()
            .filter(dropshipper::Column::Email.eq(request.email.clone()))
            .one(db)
            .await?;
        if exists.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Dropshipper with email {} already exists",
                request.email
            )));
        }

        let now = Utc::now();
        let model = dropshipper::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            email: Set(request.email),
            password_hash: Set(hash_password(&request.password)?),
            phone: Set(request.phone),
            store_name: Set(request.store_name),
            website: Set(request.website),
            is_active: Set(true),
            is_verified: Set(false),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(db)
        .await?;

        info!(dropshipper_id = %model.id, "dropshipper account created");
        Ok(model)
    }

    #[instrument(skip(self, request))]
    pub async fn update_dropshipper(
        &self,
        id: Uuid,
        request: UpdateDropshipperAccount,
    ) -> Result<dropshipper::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let model = dropshipper::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Dropshipper {id} not found")))?;

        let mut active: dropshipper::ActiveModel = model.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if request.phone.is_some() {
            active.phone = Set(request.phone);
        }
        if request.store_name.is_some() {
            active.store_name = Set(request.store_name);
        }
        if request.website.is_some() {
            active.website = Set(request.website);
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_dropshipper_status(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> Result<dropshipper::Model, ServiceError> {
        let db = &*self.db_pool;
        let model = dropshipper::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Dropshipper {id} not found")))?;
        let mut active: dropshipper::ActiveModel = model.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_dropshipper_verified(
        &self,
        id: Uuid,
        is_verified: bool,
    ) -> Result<dropshipper::Model, ServiceError> {
        let db = &*self.db_pool;
        let model = dropshipper::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Dropshipper {id} not found")))?;
        let mut active: dropshipper::ActiveModel = model.into();
        active.is_verified = Set(is_verified);
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hashes_are_salted() {
        let a = hash_password("correct horse battery staple").unwrap();
        let b = hash_password("correct horse battery staple").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
    }
}
