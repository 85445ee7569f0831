//! CLI subcommands.

pub mod migrate;
pub mod seed;
pub mod user;

use sqlx::PgPool;

use shopcart_storefront::config::{ConfigError, StorefrontConfig};
use shopcart_storefront::db;

/// Errors shared by every command that needs the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Load `.env` and connect to the storefront database.
pub async fn connect() -> Result<PgPool, ConnectError> {
    let config = StorefrontConfig::from_env()?;
    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&config.database_url).await?)
}
