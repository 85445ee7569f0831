//! Order service.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use shopcart_core::{CartItem, NewOrder, Order, OrderId, StatusPolicy, User};

use super::ServiceError;
use crate::db::OrderStore;

/// Order creation, history and status changes.
pub struct OrderService<'a> {
    store: &'a dyn OrderStore,
    policy: StatusPolicy,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub fn new(store: &'a dyn OrderStore) -> Self {
        Self {
            store,
            policy: StatusPolicy::default(),
        }
    }

    /// Use `policy` to validate status updates.
    #[must_use]
    pub fn with_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Persist a pending order snapshotting `items` at their current prices.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Invalid` if `items` is empty or over the quantity
    /// or total limits, and `ServiceError::Fault` if the order cannot be stored
    /// (nothing is stored).
    #[instrument(skip(self, user, items), fields(user = %user.username, lines = items.len()))]
    pub async fn create_order(&self, user: &User, items: &[CartItem]) -> Result<Order, ServiceError> {
        let draft = NewOrder::from_cart(user, items, Utc::now()).map_err(ServiceError::invalid)?;
        let order = self
            .store
            .save(draft)
            .await
            .map_err(|e| ServiceError::fault("create order", e))?;
        info!(order_id = %order.id, total = %order.total, "Order created");
        Ok(order)
    }

    /// Orders placed by `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Fault` if orders cannot be read.
    #[instrument(skip(self, user), fields(user = %user.username))]
    pub async fn orders_for(&self, user: &User) -> Result<Vec<Order>, ServiceError> {
        let orders = self
            .store
            .find_by_user(user.id)
            .await
            .map_err(|e| ServiceError::fault("list user orders", e))?;
        debug!(count = orders.len(), "Listed user orders");
        Ok(orders)
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Fault` if orders cannot be read.
    #[instrument(skip(self))]
    pub async fn all_orders(&self) -> Result<Vec<Order>, ServiceError> {
        self.store
            .find_all()
            .await
            .map_err(|e| ServiceError::fault("list orders", e))
    }

    /// Look up one order. A missing order is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Fault` if the order cannot be read.
    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, ServiceError> {
        let order = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::fault("get order", e))?;
        if order.is_none() {
            warn!(order_id = %id, "Order not found");
        }
        Ok(order)
    }

    /// Validate `status` against the policy and store it.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Invalid` if the policy rejects the label,
    /// `ServiceError::OrderNotFound` if the order does not exist and
    /// `ServiceError::Fault` if the update cannot be stored.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: &str) -> Result<Order, ServiceError> {
        let status = self.policy.parse(status).map_err(ServiceError::invalid)?;
        let order = self
            .store
            .update_status(id, &status)
            .await
            .map_err(|e| ServiceError::fault("update order status", e))?
            .ok_or_else(|| {
                warn!(order_id = %id, "Status update for missing order");
                ServiceError::OrderNotFound(id)
            })?;
        info!(order_id = %id, status = %order.status, "Order status updated");
        Ok(order)
    }
}
