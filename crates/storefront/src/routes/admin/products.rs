//! Admin product management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopcart_core::{Product, ProductId, ProductInput, parse_price};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::views::{Flash, PageContext, redirect_with};
use crate::services::{CatalogService, ServiceError};
use crate::state::AppState;

/// Product form data. The price is kept as typed so the form can be
/// re-rendered unchanged when it is rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub image_url: String,
}

impl ProductForm {
    fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.round_dp(2).to_string(),
            image_url: product.image_url.clone(),
        }
    }

    fn to_input(&self) -> std::result::Result<ProductInput, String> {
        let price = parse_price(&self.price).map_err(|e| e.to_string())?;
        Ok(ProductInput {
            name: self.name.clone(),
            description: self.description.clone(),
            price,
            image_url: self.image_url.clone(),
        })
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/product_form.html")]
pub struct ProductFormTemplate {
    pub ctx: PageContext,
    pub heading: &'static str,
    pub action: String,
    pub form: ProductForm,
    pub error: Option<String>,
}

impl ProductFormTemplate {
    fn create(ctx: PageContext, form: ProductForm, error: Option<String>) -> Self {
        Self {
            ctx,
            heading: "New product",
            action: "/admin/products".to_owned(),
            form,
            error,
        }
    }

    fn edit(ctx: PageContext, id: ProductId, form: ProductForm, error: Option<String>) -> Self {
        Self {
            ctx,
            heading: "Edit product",
            action: format!("/admin/products/{id}"),
            form,
            error,
        }
    }
}

/// Rejected input re-renders the form with the reason.
fn rejected(page: ProductFormTemplate) -> Response {
    (StatusCode::BAD_REQUEST, page).into_response()
}

/// Empty product form.
pub async fn new_product(RequireAdmin(_admin): RequireAdmin, ctx: PageContext) -> impl IntoResponse {
    ProductFormTemplate::create(ctx, ProductForm::default(), None)
}

/// Create a product.
#[instrument(skip(state, ctx, admin), fields(admin = %admin.username))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(reason) => return Ok(rejected(ProductFormTemplate::create(ctx, form, Some(reason)))),
    };

    match CatalogService::new(state.catalog()).create(input).await {
        Ok(_) => Ok(redirect_with("/", Flash::ProductSaved).into_response()),
        Err(ServiceError::Invalid(reason)) => {
            Ok(rejected(ProductFormTemplate::create(ctx, form, Some(reason))))
        }
        Err(e) => Err(e.into()),
    }
}

/// Product form filled with the current values.
#[instrument(skip(state, ctx, _admin))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<ProductFormTemplate> {
    let id = ProductId::new(id);
    let product = CatalogService::new(state.catalog())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;

    Ok(ProductFormTemplate::edit(
        ctx,
        id,
        ProductForm::from_product(&product),
        None,
    ))
}

/// Overwrite a product.
#[instrument(skip(state, ctx, admin), fields(admin = %admin.username))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    Path(id): Path<i32>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let id = ProductId::new(id);
    let input = match form.to_input() {
        Ok(input) => input,
        Err(reason) => return Ok(rejected(ProductFormTemplate::edit(ctx, id, form, Some(reason)))),
    };

    match CatalogService::new(state.catalog()).update(id, input).await {
        Ok(_) => Ok(redirect_with("/", Flash::ProductSaved).into_response()),
        Err(ServiceError::Invalid(reason)) => {
            Ok(rejected(ProductFormTemplate::edit(ctx, id, form, Some(reason))))
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a product. Placed orders keep their snapshot of it.
#[instrument(skip(state, admin), fields(admin = %admin.username))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Response> {
    let deleted = CatalogService::new(state.catalog())
        .delete(ProductId::new(id))
        .await?;

    let flash = if deleted {
        Flash::ProductDeleted
    } else {
        Flash::ProductNotFound
    };
    Ok(redirect_with("/", flash).into_response())
}
