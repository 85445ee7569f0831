//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use shopcart_core::StatusPolicy;

use crate::config::StorefrontConfig;
use crate::db::{
    CatalogStore, OrderStore, PgCatalogStore, PgOrderStore, PgUserStore, UserStore,
};
use crate::services::CartStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// stores, the session carts and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<dyn CatalogStore>,
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserStore>,
    carts: CartStore,
}

impl AppState {
    /// Create application state backed by `PostgreSQL`.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        Self::with_stores(
            config,
            Arc::new(PgCatalogStore::new(pool.clone())),
            Arc::new(PgOrderStore::new(pool.clone())),
            Arc::new(PgUserStore::new(pool)),
        )
    }

    /// Create application state over arbitrary stores (tests, demos).
    #[must_use]
    pub fn with_stores(
        config: StorefrontConfig,
        catalog: Arc<dyn CatalogStore>,
        orders: Arc<dyn OrderStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                carts: CartStore::with_capacity(config.max_carts),
                config,
                catalog,
                orders,
                users,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Policy applied to admin status updates.
    #[must_use]
    pub fn status_policy(&self) -> StatusPolicy {
        self.inner.config.status_policy
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.inner.catalog.as_ref()
    }

    #[must_use]
    pub fn orders(&self) -> &dyn OrderStore {
        self.inner.orders.as_ref()
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Live session carts.
    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }
}
