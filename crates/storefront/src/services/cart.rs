//! Session carts.
//!
//! Carts live in a [`CartStore`] keyed by a random [`CartKey`] that the
//! session remembers. Each cart sits behind its own async mutex, so two
//! requests from the same session never interleave cart mutations while other
//! sessions proceed independently. Idle carts expire with their sessions.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use moka::notification::RemovalCause;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use shopcart_core::{Cart, CartError, CartItem, CartLine, Product, ProductId, cart_total};

use super::ServiceError;
use crate::db::{CatalogStore, RepositoryError};

/// Carts idle longer than this are dropped (matches the session expiry).
const CART_IDLE_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default upper bound on concurrently held carts.
///
/// Carts are in memory, so the bound caps what anonymous `/cart/add` traffic
/// can allocate. Past it the cache's frequency-based admission keeps carts in
/// active use and drops rarely touched ones, so a flood of one-off sessions
/// mostly displaces other one-off carts. A dropped cart reopens empty.
pub const DEFAULT_MAX_CARTS: u64 = 100_000;

/// Session-scoped cart identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartKey(Uuid);

impl CartKey {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CartKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// All live carts, keyed by session cart key.
#[derive(Clone)]
pub struct CartStore {
    carts: Cache<CartKey, Arc<Mutex<Cart>>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_CARTS, CART_IDLE_TIMEOUT)
    }

    /// Store holding at most `max_carts` carts, each dropped after `idle`
    /// without access.
    #[must_use]
    pub fn with_limits(max_carts: u64, idle: Duration) -> Self {
        Self {
            carts: Cache::builder()
                .max_capacity(max_carts)
                .time_to_idle(idle)
                .eviction_listener(|key, _, cause| {
                    if cause == RemovalCause::Size {
                        warn!(cart = %key, "Cart evicted at capacity");
                    }
                })
                .build(),
        }
    }

    /// Store sized by `SHOPCART_MAX_CARTS`.
    #[must_use]
    pub fn with_capacity(max_carts: u64) -> Self {
        Self::with_limits(max_carts, CART_IDLE_TIMEOUT)
    }

    /// The cart for `key`, created empty on first access.
    pub async fn open(&self, key: CartKey) -> CartHandle {
        let cart = self
            .carts
            .get_with(key, async { Arc::new(Mutex::new(Cart::new())) })
            .await;
        CartHandle { key, cart }
    }

    /// The cart for `key` if one has been created.
    pub async fn existing(&self, key: CartKey) -> Option<CartHandle> {
        self.carts
            .get(&key)
            .await
            .map(|cart| CartHandle { key, cart })
    }

    /// Forget a cart (session ended).
    pub async fn discard(&self, key: CartKey) {
        self.carts.invalidate(&key).await;
    }
}

/// A request's handle on one session cart.
#[derive(Clone)]
pub struct CartHandle {
    key: CartKey,
    cart: Arc<Mutex<Cart>>,
}

impl CartHandle {
    #[must_use]
    pub const fn key(&self) -> CartKey {
        self.key
    }

    /// Exclusive access to the cart until the guard is dropped.
    pub async fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().await
    }
}

/// Resolved cart contents and their total at current prices.
#[derive(Debug, Clone, Default)]
pub struct CartSummary {
    pub items: Vec<CartItem>,
    pub total: Decimal,
}

/// Join cart lines with the current catalog. Lines whose product has been
/// deleted are skipped.
pub(crate) async fn resolve_lines(
    catalog: &dyn CatalogStore,
    lines: &[CartLine],
) -> Result<Vec<CartItem>, RepositoryError> {
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        match catalog.find_by_id(line.product_id).await? {
            Some(product) => items.push(CartItem {
                product,
                quantity: line.quantity,
            }),
            None => warn!(product_id = %line.product_id, "Skipping cart line for deleted product"),
        }
    }
    Ok(items)
}

/// Cart operations against the live catalog.
pub struct CartService<'a> {
    catalog: &'a dyn CatalogStore,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(catalog: &'a dyn CatalogStore) -> Self {
        Self { catalog }
    }

    /// Add one unit of a product. Returns the product, or `None` if it is not
    /// in the catalog (the cart is left unchanged).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Fault` if the catalog cannot be read, or
    /// `ServiceError::Invalid` if the line is already at its maximum quantity.
    #[instrument(skip(self, cart), fields(cart = %cart.key()))]
    pub async fn add(
        &self,
        cart: &CartHandle,
        product_id: ProductId,
    ) -> Result<Option<Product>, ServiceError> {
        let Some(product) = self
            .catalog
            .find_by_id(product_id)
            .await
            .map_err(|e| ServiceError::fault("add to cart", e))?
        else {
            warn!(product_id = %product_id, "Product not found");
            return Ok(None);
        };

        let quantity = cart
            .lock()
            .await
            .add(product_id)
            .map_err(|e| match e {
                CartError::QuantityOverflow(_) => ServiceError::invalid(e),
                other => ServiceError::fault("add to cart", other),
            })?;
        info!(product_id = %product_id, quantity, "Added product to cart");
        Ok(Some(product))
    }

    /// Remove a product's line. Returns whether anything was removed.
    #[instrument(skip(self, cart), fields(cart = %cart.key()))]
    pub async fn remove(&self, cart: &CartHandle, product_id: ProductId) -> bool {
        let removed = cart.lock().await.remove(product_id);
        info!(product_id = %product_id, removed, "Removed product from cart");
        removed
    }

    /// Set a line's quantity; zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Invalid` if `quantity` is larger than a line can hold.
    #[instrument(skip(self, cart), fields(cart = %cart.key()))]
    pub async fn update_quantity(
        &self,
        cart: &CartHandle,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), ServiceError> {
        cart.lock()
            .await
            .update_quantity(product_id, quantity)
            .map_err(|e| match e {
                CartError::QuantityTooLarge(_) => ServiceError::invalid(e),
                other => ServiceError::fault("update cart quantity", other),
            })?;
        info!(product_id = %product_id, quantity, "Updated cart quantity");
        Ok(())
    }

    /// Cart items priced from the catalog as it is now.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Fault` if the catalog cannot be read.
    pub async fn items(&self, cart: &CartHandle) -> Result<Vec<CartItem>, ServiceError> {
        let lines = cart.lock().await.lines().to_vec();
        resolve_lines(self.catalog, &lines)
            .await
            .map_err(|e| ServiceError::fault("read cart", e))
    }

    /// Items and total for display. A session without a cart is empty.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Fault` if the catalog cannot be read.
    pub async fn summary(&self, cart: Option<&CartHandle>) -> Result<CartSummary, ServiceError> {
        let Some(cart) = cart else {
            return Ok(CartSummary::default());
        };
        let items = self.items(cart).await?;
        let total = cart_total(&items);
        debug!(cart = %cart.key(), lines = items.len(), %total, "Read cart");
        Ok(CartSummary { items, total })
    }

    /// Σ quantity × current price.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Fault` if the catalog cannot be read.
    pub async fn total(&self, cart: &CartHandle) -> Result<Decimal, ServiceError> {
        Ok(cart_total(&self.items(cart).await?))
    }

    /// Number of units in the cart for the header badge. Never fails: any
    /// fault is logged and reported as zero.
    pub async fn item_count(&self, cart: Option<&CartHandle>) -> u32 {
        let Some(cart) = cart else {
            return 0;
        };
        match cart.lock().await.item_count() {
            Ok(count) => count,
            Err(e) => {
                error!(cart = %cart.key(), error = %e, "Failed to count cart items");
                0
            }
        }
    }

    /// Empty the cart.
    pub async fn clear(&self, cart: &CartHandle) {
        cart.lock().await.clear();
        info!(cart = %cart.key(), "Cleared cart");
    }
}
