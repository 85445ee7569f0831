//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! shop-cli user create -u alice -p s3cret! -r admin
//! ```

use thiserror::Error;

use shopcart_core::Role;
use shopcart_storefront::db::PgUserStore;
use shopcart_storefront::services::auth::{AuthError, AuthService};

use super::ConnectError;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: admin, user")]
    InvalidRole(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a new user.
///
/// # Arguments
///
/// * `username` - Login name
/// * `password` - Plain-text password (hashed with Argon2id before storing)
/// * `role` - `admin` or `user`
///
/// # Errors
///
/// Returns `UserError` if the role is unknown, the username is taken or the
/// password is too short.
pub async fn create(username: &str, password: &str, role: &str) -> Result<(), UserError> {
    let role: Role = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;

    let pool = super::connect().await?;
    let users = PgUserStore::new(pool);
    let user = AuthService::new(&users)
        .register(username, password, role)
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "User created");
    Ok(())
}
