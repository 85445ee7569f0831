//! Shopcart Core - Domain types and cart/order logic.
//!
//! This crate provides the pieces shared by every Shopcart component:
//! - `storefront` - Web service (catalog, cart, checkout, administration)
//! - `cli` - Command-line tools for migrations, users and demo data
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Stores and services in the storefront crate feed it data
//! and persist what it produces.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, price helpers, roles and order statuses
//! - [`product`] - Catalog product and its validated input
//! - [`user`] - Account identity used as order owner and access subject
//! - [`cart`] - Session cart lines and live-priced cart items
//! - [`order`] - Orders, snapshotted order items and drafting from a cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod order;
pub mod product;
pub mod types;
pub mod user;

pub use cart::{Cart, CartError, CartItem, CartLine, MAX_LINE_QUANTITY, cart_total};
pub use order::{MAX_ORDER_TOTAL, NewOrder, Order, OrderDraftError, OrderItem, OrderOwner};
pub use product::{MAX_PRICE, Product, ProductError, ProductInput};
pub use types::*;
pub use user::User;
