//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (catalog store)
//!
//! # Catalog
//! GET  /                             - Product listing
//! GET  /products/{id}                - Product detail
//!
//! # Cart
//! GET  /cart                         - Cart page
//! POST /cart/add                     - Add one unit, back to the catalog
//! POST /cart/update                  - Set a line's quantity
//! POST /cart/remove                  - Remove a line
//! GET  /cart/count                   - Cart badge count (JSON)
//! POST /buy-now/{id}                 - Add one unit, go to checkout
//!
//! # Checkout (signed in)
//! GET  /checkout                     - Review cart
//! GET  /payment                      - Payment page
//! POST /payment                      - Place order, show confirmation
//!
//! # Account (signed in)
//! GET  /account/orders               - Order history
//! GET  /orders/{id}                  - Order detail (owner or admin)
//!
//! # Auth
//! GET  /auth/login                   - Login page
//! POST /auth/login                   - Login action (rate limited)
//! POST /auth/logout                  - Logout action
//!
//! # Admin
//! GET  /admin/products/new           - New product form
//! POST /admin/products               - Create product
//! GET  /admin/products/{id}/edit     - Edit product form
//! POST /admin/products/{id}          - Update product
//! POST /admin/products/{id}/delete   - Delete product
//! GET  /admin/orders                 - Order dashboard
//! POST /admin/orders/{id}/status     - Update order status
//!
//! # Product API (writes are admin-only)
//! GET    /api/products               - List
//! GET    /api/products/{id}          - Show
//! POST   /api/products               - Create
//! PUT    /api/products/{id}          - Update
//! DELETE /api/products/{id}          - Delete
//! ```

pub mod account;
pub mod admin;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod home;
pub mod products;
pub mod views;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
///
/// `trust_proxy_headers` decides how the login rate limiter finds the client IP.
pub fn auth_routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page)
                .merge(post(auth::login).layer(auth_rate_limiter(trust_proxy_headers))),
        )
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Catalog
        .route("/", get(home::home))
        .route("/products/{id}", get(products::show))
        // Cart
        .nest("/cart", cart_routes())
        .route("/buy-now/{id}", post(cart::buy_now))
        // Checkout
        .route("/checkout", get(checkout::show))
        .route(
            "/payment",
            get(checkout::payment_page).post(checkout::process_payment),
        )
        // Account
        .route("/account/orders", get(account::orders))
        .route("/orders/{id}", get(account::show_order))
        // Auth
        .nest("/auth", auth_routes(trust_proxy_headers))
        // Admin
        .nest("/admin", admin::routes())
        // Product API
        .nest(
            "/api/products",
            api::product_routes().layer(api_rate_limiter(trust_proxy_headers)),
        )
}
