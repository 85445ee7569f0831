//! Session-facing models for the storefront.
//!
//! Domain types (`Product`, `Order`, `User`, `Cart`) live in `shopcart-core`;
//! this module holds what the web layer keeps in the session.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
