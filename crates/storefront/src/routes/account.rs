//! Account route handlers: order history and order detail.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use shopcart_core::{OrderId, User};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::views::{OrderView, PageContext};
use crate::services::OrderService;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub ctx: PageContext,
    pub orders: Vec<OrderView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderTemplate {
    pub ctx: PageContext,
    pub order: OrderView,
}

/// The signed-in user's orders, newest first.
#[instrument(skip(state, ctx, user), fields(user = %user.username))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> Result<OrdersTemplate> {
    let orders = OrderService::new(state.orders())
        .orders_for(&User::from(user))
        .await?;

    Ok(OrdersTemplate {
        ctx,
        orders: orders.iter().map(OrderView::from).collect(),
    })
}

/// One order. Visible to its owner and to admins; anyone else gets 404.
#[instrument(skip(state, ctx, user), fields(user = %user.username))]
pub async fn show_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<OrderTemplate> {
    let user = User::from(user);
    let order = OrderService::new(state.orders())
        .get(OrderId::new(id))
        .await?
        .filter(|order| order.is_visible_to(&user))
        .ok_or_else(|| AppError::NotFound("Order".to_owned()))?;

    Ok(OrderTemplate {
        ctx,
        order: OrderView::from(&order),
    })
}
