//! JSON API route handlers.

pub mod products;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the product API router.
///
/// Reads are public; writes are admin-only and answer 401/403 as JSON
/// clients expect.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}
