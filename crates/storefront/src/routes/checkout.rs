//! Checkout and payment route handlers.
//!
//! Payment is a stub: submitting the payment page places the order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use shopcart_core::{User, format_price};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, existing_cart};
use crate::routes::views::{CartLineView, Flash, OrderView, PageContext, redirect_with};
use crate::services::{CartService, CheckoutService};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub lines: Vec<CartLineView>,
    pub total: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {
    pub ctx: PageContext,
    pub total: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub ctx: PageContext,
    pub order: OrderView,
}

/// Review the cart before paying.
#[instrument(skip(state, session, ctx, _user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    ctx: PageContext,
) -> Result<Response> {
    let cart = existing_cart(&session, state.carts()).await?;
    let summary = CartService::new(state.catalog())
        .summary(cart.as_ref())
        .await?;
    if summary.items.is_empty() {
        return Ok(redirect_with("/cart", Flash::EmptyCart).into_response());
    }

    Ok(CheckoutTemplate {
        ctx,
        lines: summary.items.iter().map(CartLineView::from).collect(),
        total: format_price(summary.total),
    }
    .into_response())
}

/// Payment page.
#[instrument(skip(state, session, ctx, _user))]
pub async fn payment_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    ctx: PageContext,
) -> Result<Response> {
    let cart = existing_cart(&session, state.carts()).await?;
    let summary = CartService::new(state.catalog())
        .summary(cart.as_ref())
        .await?;
    if summary.items.is_empty() {
        return Ok(redirect_with("/cart", Flash::EmptyCart).into_response());
    }

    Ok(PaymentTemplate {
        ctx,
        total: format_price(summary.total),
    }
    .into_response())
}

/// Take the (stub) payment, place the order and empty the cart.
#[instrument(skip(state, session, ctx, user), fields(user = %user.username))]
pub async fn process_payment(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    mut ctx: PageContext,
) -> Result<Response> {
    let Some(cart) = existing_cart(&session, state.carts()).await? else {
        return Ok(redirect_with("/cart", Flash::EmptyCart).into_response());
    };

    let user = User::from(user);
    let placed = CheckoutService::new(state.catalog(), state.orders())
        .place_order(&user, &cart)
        .await?;
    let Some(order) = placed else {
        return Ok(redirect_with("/cart", Flash::EmptyCart).into_response());
    };

    let order_id = order.id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

    ctx.cart_count = 0;
    ctx.flash = Some(Flash::OrderPlaced);
    Ok(ConfirmationTemplate {
        ctx,
        order: OrderView::from(&order),
    }
    .into_response())
}
