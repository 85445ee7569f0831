//! Cart route handlers.
//!
//! The cart key is stored in the session; cart contents live in the
//! in-process [`CartStore`](crate::services::CartStore). Mutations redirect
//! with a flash message so a refresh never repeats them.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use shopcart_core::{ProductId, format_price};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{existing_cart, session_cart};
use crate::routes::views::{CartLineView, Flash, PageContext, redirect_with};
use crate::services::CartService;
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
}

/// Cart badge payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCount {
    pub item_count: u32,
}

#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub ctx: PageContext,
    pub lines: Vec<CartLineView>,
    pub total: String,
}

/// Show the cart priced at current catalog prices.
#[instrument(skip(state, session, ctx))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
) -> Result<CartTemplate> {
    let cart = existing_cart(&session, state.carts()).await?;
    let summary = CartService::new(state.catalog())
        .summary(cart.as_ref())
        .await?;

    Ok(CartTemplate {
        ctx,
        lines: summary.items.iter().map(CartLineView::from).collect(),
        total: format_price(summary.total),
    })
}

/// Add one unit of a product and go back to the catalog.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let cart = session_cart(&session, state.carts()).await?;
    let added = CartService::new(state.catalog())
        .add(&cart, ProductId::new(form.product_id))
        .await?;

    Ok(match added {
        Some(product) => {
            let product_id = product.id.to_string();
            add_breadcrumb(
                "cart",
                "Added product",
                Some(&[("product_id", product_id.as_str())]),
            );
            redirect_with("/", Flash::Added)
        }
        None => redirect_with("/", Flash::ProductNotFound),
    })
}

/// Add one unit of a product and go straight to checkout.
#[instrument(skip(state, session))]
pub async fn buy_now(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    let cart = session_cart(&session, state.carts()).await?;
    let added = CartService::new(state.catalog())
        .add(&cart, ProductId::new(id))
        .await?;

    Ok(match added {
        Some(_) => Redirect::to("/checkout"),
        None => redirect_with("/", Flash::ProductNotFound),
    })
}

/// Set a line's quantity; zero or less removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let cart = session_cart(&session, state.carts()).await?;
    CartService::new(state.catalog())
        .update_quantity(&cart, ProductId::new(form.product_id), form.quantity)
        .await?;
    Ok(redirect_with("/cart", Flash::Updated))
}

/// Remove a product's line.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    if let Some(cart) = existing_cart(&session, state.carts()).await? {
        CartService::new(state.catalog())
            .remove(&cart, ProductId::new(form.product_id))
            .await;
    }
    Ok(redirect_with("/cart", Flash::Removed))
}

/// Cart badge count. Never fails.
pub async fn count(State(state): State<AppState>, session: Session) -> Response {
    let cart = existing_cart(&session, state.carts())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to read cart from session: {e}");
            None
        });
    let item_count = CartService::new(state.catalog())
        .item_count(cart.as_ref())
        .await;

    Json(CartCount { item_count }).into_response()
}
