//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `catalog` - Product listing, lookup and administration
//! - `cart` - Session cart store and live-priced cart reads
//! - `orders` - Order creation, history and status changes
//! - `checkout` - Turns a session cart into an order
//! - `auth` - Password login and account creation
//!
//! Services borrow their stores from [`crate::state::AppState`] for the
//! length of one request and return [`ServiceError`] for mutation faults.
//! Lookups return `Option` and leave not-found handling to the caller.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

mod error;

pub use cart::{CartHandle, CartKey, CartService, CartStore, CartSummary};
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use error::ServiceError;
pub use orders::OrderService;
