//! Admin order dashboard and status updates.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use shopcart_core::{OrderId, StatusPolicy};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::views::{Flash, OrderView, PageContext, redirect_with};
use crate::services::OrderService;
use crate::state::AppState;

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// One row of the dashboard with its status picker.
pub struct AdminOrderRow {
    pub order: OrderView,
    pub options: Vec<StatusOption>,
}

/// One entry in a status picker.
pub struct StatusOption {
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct AdminOrdersTemplate {
    pub ctx: PageContext,
    pub rows: Vec<AdminOrderRow>,
    /// Whether labels outside the picker are accepted.
    pub free_text: bool,
}

/// Every order, newest first.
#[instrument(skip(state, ctx, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ctx: PageContext,
) -> Result<AdminOrdersTemplate> {
    let policy = state.status_policy();
    let orders = OrderService::new(state.orders())
        .with_policy(policy)
        .all_orders()
        .await?;

    let rows = orders
        .iter()
        .map(|order| AdminOrderRow {
            options: policy
                .suggestions()
                .iter()
                .copied()
                .map(|label| StatusOption {
                    label,
                    selected: order.status.as_str() == label,
                })
                .collect(),
            order: OrderView::from(order),
        })
        .collect();

    Ok(AdminOrdersTemplate {
        ctx,
        rows,
        free_text: policy == StatusPolicy::Open,
    })
}

/// Set an order's status.
#[instrument(skip(state, admin), fields(admin = %admin.username))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    OrderService::new(state.orders())
        .with_policy(state.status_policy())
        .update_status(OrderId::new(id), &form.status)
        .await?;

    Ok(redirect_with("/admin/orders", Flash::StatusUpdated))
}
