//! Home page route handler: the product catalog.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::views::{PageContext, ProductView};
use crate::services::CatalogService;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub products: Vec<ProductView>,
}

/// List every product.
#[instrument(skip(state, ctx))]
pub async fn home(State(state): State<AppState>, ctx: PageContext) -> Result<HomeTemplate> {
    let products = CatalogService::new(state.catalog()).list().await?;

    Ok(HomeTemplate {
        ctx,
        products: products.iter().map(ProductView::from).collect(),
    })
}
