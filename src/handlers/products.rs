use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{perm, require_permission, DropshipperIdentity, PanelIdentity, SupplierIdentity},
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, message_response, paginated_response,
        success_response, ListParams,
    },
    services::products::{CatalogFilter, CreateProductRequest, UpdateProductRequest},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct PublishBody {
    pub is_published: bool,
}

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub search: Option<String>,
    pub category: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

// Supplier panel

pub async fn list_products(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::PRODUCTS_VIEW).await?;

    let (products, total) = state
        .services
        .products
        .list_supplier_products(
            identity.account_id(),
            params.page,
            params.per_page,
            params.search.as_deref(),
        )
        .await
        .map_err(map_service_error)?;

    Ok(paginated_response(
        products,
        params.page,
        params.per_page,
        total,
    ))
}

pub async fn get_product(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::PRODUCTS_VIEW).await?;

    let product = state
        .services
        .products
        .get_product(identity.account_id(), product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::PRODUCTS_MANAGE).await?;

    let product = state
        .services
        .products
        .create_product(identity.account_id(), payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::PRODUCTS_MANAGE).await?;

    let product = state
        .services
        .products
        .update_product(identity.account_id(), product_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

pub async fn set_product_published(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<PublishBody>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::PRODUCTS_MANAGE).await?;

    state
        .services
        .products
        .set_published(identity.account_id(), product_id, payload.is_published)
        .await
        .map_err(map_service_error)?;

    Ok(message_response("Product publish state updated"))
}

pub async fn delete_product(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::PRODUCTS_MANAGE).await?;

    state
        .services
        .products
        .delete_product(identity.account_id(), product_id)
        .await
        .map_err(map_service_error)?;

    Ok(message_response("Product deleted"))
}

/// Multipart image upload for a product.
///
/// The file lands on disk first; if the catalog update then fails, the
/// stored file is removed again so failed requests leave no orphans.
pub async fn upload_product_image(
    State(state): State<AppState>,
    identity: SupplierIdentity,
    Path(product_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::PRODUCTS_MANAGE).await?;

    let mut stored = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field
            .file_name()
            .map(|f| f.to_string())
            .ok_or_else(|| ApiError::BadRequest("image field must be a file".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;

        stored = Some(
            state
                .services
                .uploads
                .save("products", &filename, &bytes)
                .await
                .map_err(map_service_error)?,
        );
        break;
    }

    let stored =
        stored.ok_or_else(|| ApiError::BadRequest("image field is required".to_string()))?;

    match state
        .services
        .products
        .attach_image(
            identity.account_id(),
            product_id,
            stored.relative_path.clone(),
        )
        .await
    {
        Ok(previous) => {
            if let Some(previous) = previous {
                state.services.uploads.remove(&previous).await;
            }
            Ok(success_response(serde_json::json!({
                "image_path": stored.relative_path,
                "size": stored.size,
            })))
        }
        Err(err) => {
            state.services.uploads.remove(&stored.relative_path).await;
            Err(map_service_error(err))
        }
    }
}

// Dropshipper panel

pub async fn browse_catalog(
    State(state): State<AppState>,
    identity: DropshipperIdentity,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_permission(&state, &identity, perm::PRODUCTS_VIEW).await?;

    let (products, total) = state
        .services
        .products
        .browse_catalog(
            CatalogFilter {
                search: query.search.as_deref(),
                category: query.category.as_deref(),
            },
            query.page,
            query.per_page,
        )
        .await
        .map_err(map_service_error)?;

    Ok(paginated_response(products, query.page, query.per_page, total))
}
