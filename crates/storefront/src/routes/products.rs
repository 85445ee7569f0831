//! Product detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use shopcart_core::ProductId;

use crate::error::Result;
use crate::filters;
use crate::routes::views::{Flash, PageContext, ProductView, redirect_with};
use crate::services::CatalogService;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub ctx: PageContext,
    pub product: ProductView,
}

/// Show one product. Unknown products send the shopper back to the catalog.
#[instrument(skip(state, ctx))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<Response> {
    let product = CatalogService::new(state.catalog())
        .get(ProductId::new(id))
        .await?;

    Ok(match product {
        Some(product) => ProductTemplate {
            ctx,
            product: ProductView::from(&product),
        }
        .into_response(),
        None => redirect_with("/", Flash::ProductNotFound).into_response(),
    })
}

