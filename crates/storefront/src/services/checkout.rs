//! Checkout: session cart to persisted order.

use tracing::{info, instrument, warn};

use shopcart_core::{Order, User};

use super::cart::resolve_lines;
use super::{CartHandle, OrderService, ServiceError};
use crate::db::{CatalogStore, OrderStore};

/// Places orders from session carts.
pub struct CheckoutService<'a> {
    catalog: &'a dyn CatalogStore,
    orders: &'a dyn OrderStore,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(catalog: &'a dyn CatalogStore, orders: &'a dyn OrderStore) -> Self {
        Self { catalog, orders }
    }

    /// Turn the cart into an order for `user` and empty the cart.
    ///
    /// The cart stays locked from pricing until it is cleared, so a repeated
    /// submission from the same session sees the emptied cart instead of
    /// ordering twice. The cart is cleared only after the order is stored.
    ///
    /// Returns `Ok(None)` when there is nothing to order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Invalid` if the cart exceeds the order limits and
    /// `ServiceError::Fault` if pricing or storing the order fails; either way
    /// the cart is left untouched.
    #[instrument(skip(self, user, cart), fields(user = %user.username, cart = %cart.key()))]
    pub async fn place_order(
        &self,
        user: &User,
        cart: &CartHandle,
    ) -> Result<Option<Order>, ServiceError> {
        let mut guard = cart.lock().await;
        if guard.is_empty() {
            warn!("Checkout with empty cart");
            return Ok(None);
        }

        let items = resolve_lines(self.catalog, guard.lines())
            .await
            .map_err(|e| ServiceError::fault("price cart", e))?;
        if items.is_empty() {
            warn!("Every product in the cart has been removed from the catalog");
            guard.clear();
            return Ok(None);
        }

        let order = OrderService::new(self.orders)
            .create_order(user, &items)
            .await?;
        guard.clear();
        info!(order_id = %order.id, "Checkout complete");
        Ok(Some(order))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shopcart_core::{NewOrder, OrderId, OrderStatus, ProductId, ProductInput, Role, UserId};

    use super::*;
    use crate::db::RepositoryError;
    use crate::db::memory::{MemoryCatalogStore, MemoryOrderStore};
    use crate::services::{CartKey, CartService, CartStore};

    /// Order store whose writes always fail.
    struct BrokenOrderStore;

    #[async_trait]
    impl OrderStore for BrokenOrderStore {
        async fn save(&self, _order: NewOrder) -> Result<Order, RepositoryError> {
            Err(RepositoryError::Conflict("disk full".to_owned()))
        }
        async fn find_by_id(&self, _id: OrderId) -> Result<Option<Order>, RepositoryError> {
            Ok(None)
        }
        async fn find_by_user(&self, _user: UserId) -> Result<Vec<Order>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn update_status(
            &self,
            _id: OrderId,
            _status: &OrderStatus,
        ) -> Result<Option<Order>, RepositoryError> {
            Ok(None)
        }
    }

    fn shopper() -> User {
        User {
            id: UserId::new(2),
            username: "user".to_owned(),
            role: Role::User,
        }
    }

    fn catalog() -> MemoryCatalogStore {
        MemoryCatalogStore::with_products([
            ProductInput {
                name: "A".to_owned(),
                description: String::new(),
                price: Decimal::new(10, 0),
                image_url: String::new(),
            },
            ProductInput {
                name: "B".to_owned(),
                description: String::new(),
                price: Decimal::new(5, 0),
                image_url: String::new(),
            },
        ])
    }

    #[tokio::test]
    async fn test_place_order_creates_order_and_clears_cart() {
        let catalog = catalog();
        let orders = MemoryOrderStore::new();
        let cart = CartStore::new().open(CartKey::generate()).await;
        let carts = CartService::new(&catalog);
        carts.add(&cart, ProductId::new(1)).await.unwrap();
        carts.add(&cart, ProductId::new(1)).await.unwrap();
        carts.add(&cart, ProductId::new(2)).await.unwrap();

        let order = CheckoutService::new(&catalog, &orders)
            .place_order(&shopper(), &cart)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(order.total, Decimal::new(25, 0));
        assert_eq!(order.owner.username, "user");
        assert_eq!(carts.item_count(Some(&cart)).await, 0);
        assert_eq!(orders.len().await, 1);
    }

    #[tokio::test]
    async fn test_second_submission_finds_empty_cart() {
        let catalog = catalog();
        let orders = MemoryOrderStore::new();
        let cart = CartStore::new().open(CartKey::generate()).await;
        CartService::new(&catalog)
            .add(&cart, ProductId::new(1))
            .await
            .unwrap();
        let checkout = CheckoutService::new(&catalog, &orders);

        let (shopper_a, shopper_b) = (shopper(), shopper());
        let (first, second) = tokio::join!(
            checkout.place_order(&shopper_a, &cart),
            checkout.place_order(&shopper_b, &cart)
        );

        let placed = [first.unwrap(), second.unwrap()]
            .into_iter()
            .flatten()
            .count();
        assert_eq!(placed, 1);
        assert_eq!(orders.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_cart_places_nothing() {
        let catalog = catalog();
        let orders = MemoryOrderStore::new();
        let cart = CartStore::new().open(CartKey::generate()).await;

        let result = CheckoutService::new(&catalog, &orders)
            .place_order(&shopper(), &cart)
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(orders.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_order_keeps_the_cart() {
        let catalog = catalog();
        let cart = CartStore::new().open(CartKey::generate()).await;
        let carts = CartService::new(&catalog);
        carts.add(&cart, ProductId::new(2)).await.unwrap();

        let result = CheckoutService::new(&catalog, &BrokenOrderStore)
            .place_order(&shopper(), &cart)
            .await;

        assert!(matches!(result, Err(ServiceError::Fault { .. })));
        assert_eq!(carts.item_count(Some(&cart)).await, 1);
    }
}
