//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions and ties each
//! session to its cart.

use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;
use crate::models::session_keys;
use crate::services::{CartHandle, CartKey, CartStore};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shopcart_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over `store`.
///
/// The service uses `tower_sessions_sqlx_store::PostgresStore`; its table is
/// created by `shop-cli migrate`.
#[must_use]
pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    config: &StorefrontConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.uses_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The session's cart, if one has been opened and is still live.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn existing_cart(
    session: &Session,
    carts: &CartStore,
) -> Result<Option<CartHandle>, tower_sessions::session::Error> {
    let Some(key) = session.get::<CartKey>(session_keys::CART_ID).await? else {
        return Ok(None);
    };
    Ok(carts.existing(key).await)
}

/// The session's cart, opening one on first use.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn session_cart(
    session: &Session,
    carts: &CartStore,
) -> Result<CartHandle, tower_sessions::session::Error> {
    if let Some(key) = session.get::<CartKey>(session_keys::CART_ID).await? {
        return Ok(carts.open(key).await);
    }

    let key = CartKey::generate();
    session.insert(session_keys::CART_ID, key).await?;
    tracing::debug!(cart = %key, "Opened cart for session");
    Ok(carts.open(key).await)
}
