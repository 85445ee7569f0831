//! Shared page context and display types for templates.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;

use shopcart_core::{CartItem, Order, OrderItem, Product, format_price};

use crate::error::AppError;
use crate::middleware::auth::current_user;
use crate::middleware::existing_cart;
use crate::models::CurrentUser;
use crate::services::CartService;
use crate::state::AppState;

// =============================================================================
// Flash Messages
// =============================================================================

/// One-shot feedback shown after a redirect, carried as `?flash=<code>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Added,
    ProductNotFound,
    Updated,
    Removed,
    EmptyCart,
    OrderPlaced,
    ProductSaved,
    ProductDeleted,
    StatusUpdated,
    LoginFailed,
    LoggedOut,
}

impl Flash {
    const ALL: [Self; 11] = [
        Self::Added,
        Self::ProductNotFound,
        Self::Updated,
        Self::Removed,
        Self::EmptyCart,
        Self::OrderPlaced,
        Self::ProductSaved,
        Self::ProductDeleted,
        Self::StatusUpdated,
        Self::LoginFailed,
        Self::LoggedOut,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::ProductNotFound => "product_not_found",
            Self::Updated => "updated",
            Self::Removed => "removed",
            Self::EmptyCart => "empty_cart",
            Self::OrderPlaced => "order_placed",
            Self::ProductSaved => "product_saved",
            Self::ProductDeleted => "product_deleted",
            Self::StatusUpdated => "status_updated",
            Self::LoginFailed => "login_failed",
            Self::LoggedOut => "logged_out",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flash| flash.code() == code)
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Added => "1 item added to the cart",
            Self::ProductNotFound => "Product not found",
            Self::Updated => "Cart updated",
            Self::Removed => "Item removed from the cart",
            Self::EmptyCart => "Your cart is empty",
            Self::OrderPlaced => "Order placed",
            Self::ProductSaved => "Product saved",
            Self::ProductDeleted => "Product deleted",
            Self::StatusUpdated => "Order status updated",
            Self::LoginFailed => "Invalid username or password",
            Self::LoggedOut => "You have been signed out",
        }
    }

    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::ProductNotFound | Self::EmptyCart | Self::LoginFailed)
    }

    /// CSS modifier for the flash banner.
    #[must_use]
    pub const fn class(self) -> &'static str {
        if self.is_error() { "flash--error" } else { "flash--info" }
    }
}

/// Redirect to `path` carrying `flash`.
#[must_use]
pub fn redirect_with(path: &str, flash: Flash) -> Redirect {
    Redirect::to(&format!("{path}?flash={}", flash.code()))
}

#[derive(Debug, Deserialize)]
struct FlashQuery {
    flash: Option<String>,
}

// =============================================================================
// Page Context
// =============================================================================

/// What every page's layout needs: who is signed in, the cart badge and any
/// flash message.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
    pub flash: Option<Flash>,
}

impl PageContext {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    #[must_use]
    pub fn username(&self) -> &str {
        self.user.as_ref().map_or("", |user| user.username.as_str())
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).await;

        let cart_count = match parts.extensions.get::<Session>() {
            Some(session) => {
                let cart = existing_cart(session, state.carts()).await?;
                CartService::new(state.catalog())
                    .item_count(cart.as_ref())
                    .await
            }
            None => 0,
        };

        let flash = Query::<FlashQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.flash)
            .and_then(|code| Flash::from_code(&code));

        Ok(Self {
            user,
            cart_count,
            flash,
        })
    }
}

// =============================================================================
// Display Types
// =============================================================================

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: format_price(product.price),
            image_url: product.image_url.clone(),
        }
    }
}

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: i32,
    pub name: String,
    pub image_url: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id.as_i32(),
            name: item.product.name.clone(),
            image_url: item.product.image_url.clone(),
            unit_price: format_price(item.product.price),
            quantity: item.quantity,
            line_total: format_price(item.line_total()),
        }
    }
}

/// Order line display data for templates.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: format_price(item.unit_price),
            line_total: format_price(item.line_total()),
        }
    }
}

/// Order display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub owner: String,
    pub placed_at: String,
    pub status: String,
    pub total: String,
    pub item_count: u64,
    pub items: Vec<OrderItemView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            owner: order.owner.username.clone(),
            placed_at: order.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            status: order.status.as_str().to_owned(),
            total: format_price(order.total),
            item_count: order.item_count(),
            items: order.items.iter().map(OrderItemView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_codes_round_trip() {
        for flash in Flash::ALL {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("<script>"), None);
    }

    #[test]
    fn test_added_message_matches_storefront_copy() {
        assert_eq!(Flash::Added.message(), "1 item added to the cart");
        assert!(Flash::ProductNotFound.is_error());
        assert!(!Flash::Added.is_error());
    }

    #[test]
    fn test_redirect_with_flash() {
        use axum::response::IntoResponse;

        let response = redirect_with("/", Flash::Added).into_response();
        assert_eq!(response.headers()["location"], "/?flash=added");
    }
}
