//! Persistence for the storefront.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `product` - Catalog entries
//! - `app_user` - Accounts with argon2 password hashes and a role
//! - `customer_order` - Orders with owner, status and stored total
//! - `order_item` - Snapshotted order lines (`product_id` is nulled when the
//!   product is deleted; name and unit price stay)
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Stores
//!
//! Each table group sits behind a trait so handlers and services never see
//! `sqlx` directly. The `Pg*` stores back the running service; [`memory`]
//! stores back tests and local demos and honor the same constraints.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p shopcart-cli -- migrate
//! ```

pub mod memory;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shopcart_core::{
    NewOrder, Order, OrderId, OrderStatus, Product, ProductId, ProductInput, Role, User, UserId,
};

pub use orders::PgOrderStore;
pub use products::PgCatalogStore;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique or check violation to `RepositoryError::Conflict`.
/// SQLSTATE for a value that does not fit its `NUMERIC` column.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

pub(crate) fn map_constraint(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && (db_err.is_unique_violation()
            || db_err.is_check_violation()
            || db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE))
    {
        return RepositoryError::Conflict(what.to_owned());
    }
    RepositoryError::Database(err)
}

/// An account together with its stored password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Product catalog persistence.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All products, ordered by ID.
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert when `id` is `None`, otherwise update the existing product.
    ///
    /// Updating an ID that does not exist returns `RepositoryError::NotFound`.
    async fn save(
        &self,
        id: Option<ProductId>,
        input: ProductInput,
    ) -> Result<Product, RepositoryError>;

    /// Returns whether a product was deleted.
    async fn delete_by_id(&self, id: ProductId) -> Result<bool, RepositoryError>;

    async fn count(&self) -> Result<i64, RepositoryError>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order and all of its items atomically.
    async fn save(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Orders placed by `user`, newest first.
    async fn find_by_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Every order, newest first.
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Set the status in a single write. Returns `None` if the order does not exist.
    async fn update_status(
        &self,
        id: OrderId,
        status: &OrderStatus,
    ) -> Result<Option<Order>, RepositoryError>;
}

/// Account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Returns `RepositoryError::Conflict` if the username is taken.
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, RepositoryError>;

    async fn count(&self) -> Result<i64, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the storefront schema migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
