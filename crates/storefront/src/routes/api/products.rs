//! Product JSON API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use shopcart_core::{Product, ProductId, ProductInput};

use crate::error::{ApiError, AppError};
use crate::middleware::RequireAdmin;
use crate::services::CatalogService;
use crate::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// All products, ordered by ID.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(CatalogService::new(state.catalog()).list().await?))
}

/// One product, or 404.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<Product>> {
    CatalogService::new(state.catalog())
        .get(ProductId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product".to_owned()).into())
}

/// Create a product. Responds 201 with the stored product.
#[instrument(skip(state, admin, input), fields(admin = %admin.username))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = CatalogService::new(state.catalog()).create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Overwrite a product.
#[instrument(skip(state, admin, input), fields(admin = %admin.username))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Json<Product>> {
    let product = CatalogService::new(state.catalog())
        .update(ProductId::new(id), input)
        .await?;
    Ok(Json(product))
}

/// Delete a product. Responds 204, or 404 if it did not exist.
#[instrument(skip(state, admin), fields(admin = %admin.username))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    if CatalogService::new(state.catalog())
        .delete(ProductId::new(id))
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Product".to_owned()).into())
    }
}
