//! In-process stores.
//!
//! Used by tests and local demos. They keep the same contracts as the
//! `PostgreSQL` stores: generated IDs, unique usernames, the column limits on
//! prices, quantities and totals, and all-or-nothing order writes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use shopcart_core::{
    MAX_ORDER_TOTAL, MAX_PRICE, NewOrder, Order, OrderId, OrderItem, OrderStatus, Product,
    ProductId, ProductInput, Role, User, UserId,
};

use super::{CatalogStore, OrderStore, RepositoryError, UserCredentials, UserStore};

/// Hands out increasing IDs the way a `SERIAL` column does.
#[derive(Debug)]
struct Sequence(AtomicI32);

impl Sequence {
    const fn new() -> Self {
        Self(AtomicI32::new(0))
    }

    fn next(&self) -> i32 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// In-memory product catalog.
#[derive(Debug)]
pub struct MemoryCatalogStore {
    ids: Sequence,
    products: RwLock<BTreeMap<ProductId, Product>>,
}

impl Default for MemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: Sequence::new(),
            products: RwLock::new(BTreeMap::new()),
        }
    }

    /// A catalog preloaded with `inputs`, assigned IDs `1..=n` in order.
    #[must_use]
    pub fn with_products(inputs: impl IntoIterator<Item = ProductInput>) -> Self {
        let ids = Sequence::new();
        let products = inputs
            .into_iter()
            .map(|input| {
                let id = ProductId::new(ids.next());
                (id, input.into_product(id))
            })
            .collect();

        Self {
            ids,
            products: RwLock::new(products),
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn save(
        &self,
        id: Option<ProductId>,
        input: ProductInput,
    ) -> Result<Product, RepositoryError> {
        if input.price.is_sign_negative() && !input.price.is_zero() {
            return Err(RepositoryError::Conflict(
                "product price must not be negative".to_owned(),
            ));
        }
        if input.price > MAX_PRICE {
            return Err(RepositoryError::Conflict("product price too large".to_owned()));
        }

        let mut products = self.products.write().await;
        let id = match id {
            Some(id) if products.contains_key(&id) => id,
            Some(_) => return Err(RepositoryError::NotFound),
            None => ProductId::new(self.ids.next()),
        };

        let product = input.into_product(id);
        products.insert(id, product.clone());
        Ok(product)
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count = self.products.read().await.len();
        i64::try_from(count).map_err(|_| RepositoryError::DataCorruption("catalog too large".into()))
    }
}

// =============================================================================
// Orders
// =============================================================================

/// In-memory order table.
#[derive(Debug)]
pub struct MemoryOrderStore {
    ids: Sequence,
    orders: RwLock<BTreeMap<OrderId, Order>>,
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: Sequence::new(),
            orders: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored orders.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

/// Column constraints of `order_item`.
fn check_item(item: &OrderItem) -> Result<(), RepositoryError> {
    if item.quantity == 0 {
        return Err(RepositoryError::Conflict(
            "order item quantity must be positive".to_owned(),
        ));
    }
    if i32::try_from(item.quantity).is_err() {
        return Err(RepositoryError::Conflict(
            "order item quantity too large".to_owned(),
        ));
    }
    if item.unit_price.is_sign_negative() && !item.unit_price.is_zero() {
        return Err(RepositoryError::Conflict(
            "order item price must not be negative".to_owned(),
        ));
    }
    if item.unit_price > MAX_PRICE {
        return Err(RepositoryError::Conflict("order item price too large".to_owned()));
    }
    Ok(())
}

/// Newest first; ties broken by the later ID.
fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn save(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        // The ID is consumed even when the write fails, like a sequence.
        let id = OrderId::new(self.ids.next());
        if order.total > MAX_ORDER_TOTAL {
            return Err(RepositoryError::Conflict("order total too large".to_owned()));
        }

        // Header first, then items, all under one write lock. Any rejected
        // item removes the header again before the lock is released.
        let mut orders = self.orders.write().await;
        let items = order.items.clone();
        orders.insert(
            id,
            NewOrder {
                items: Vec::with_capacity(items.len()),
                ..order
            }
            .into_order(id),
        );

        for item in items {
            if let Err(e) = check_item(&item) {
                orders.remove(&id);
                return Err(e);
            }
            if let Some(stored) = orders.get_mut(&id) {
                stored.items.push(item);
            }
        }

        orders
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::DataCorruption(format!("order {id} vanished")))
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn find_by_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|order| order.owner.id == user)
            .cloned()
            .collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: &OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut orders = self.orders.write().await;
        Ok(orders.get_mut(&id).map(|order| {
            order.status = status.clone();
            order.clone()
        }))
    }
}

// =============================================================================
// Users
// =============================================================================

/// In-memory account table.
#[derive(Debug)]
pub struct MemoryUserStore {
    ids: Sequence,
    users: RwLock<BTreeMap<UserId, UserCredentials>>,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: Sequence::new(),
            users: RwLock::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|credentials| credentials.user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .get(&id)
            .map(|credentials| credentials.user.clone()))
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.values().any(|c| c.user.username == username) {
            return Err(RepositoryError::Conflict("username already exists".to_owned()));
        }

        let user = User {
            id: UserId::new(self.ids.next()),
            username: username.to_owned(),
            role,
        };
        users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        Ok(user)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count = self.users.read().await.len();
        i64::try_from(count).map_err(|_| RepositoryError::DataCorruption("too many users".into()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use shopcart_core::OrderOwner;

    use super::*;

    fn input(name: &str, price: i64) -> ProductInput {
        ProductInput {
            name: name.to_owned(),
            description: String::new(),
            price: Decimal::new(price, 0),
            image_url: String::new(),
        }
    }

    fn owner(id: i32) -> OrderOwner {
        OrderOwner {
            id: UserId::new(id),
            username: format!("user{id}"),
        }
    }

    fn item(quantity: u32, price: i64) -> OrderItem {
        OrderItem {
            product_id: Some(ProductId::new(1)),
            product_name: "Cable".to_owned(),
            quantity,
            unit_price: Decimal::new(price, 0),
        }
    }

    fn draft(owner_id: i32, minutes_ago: i64, items: Vec<OrderItem>) -> NewOrder {
        NewOrder {
            owner: owner(owner_id),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            status: OrderStatus::pending(),
            total: Decimal::new(10, 0),
            items,
        }
    }

    #[tokio::test]
    async fn test_catalog_save_inserts_then_updates() {
        let store = MemoryCatalogStore::new();
        let created = store.save(None, input("Mouse", 20)).await.unwrap();
        let updated = store
            .save(Some(created.id), input("Mouse v2", 25))
            .await
            .unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(
            store.find_by_id(created.id).await.unwrap().unwrap().name,
            "Mouse v2"
        );
    }

    #[tokio::test]
    async fn test_catalog_update_of_missing_product_is_not_found() {
        let store = MemoryCatalogStore::new();
        let result = store.save(Some(ProductId::new(7)), input("Ghost", 1)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_catalog_rejects_negative_price() {
        let store = MemoryCatalogStore::new();
        let result = store.save(None, input("Refund", -1)).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_order_save_is_all_or_nothing() {
        let store = MemoryOrderStore::new();
        let broken = draft(1, 0, vec![item(2, 10), item(0, 5)]);

        let result = store.save(broken).await;

        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert!(store.is_empty().await);
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_later_item_rolls_back_header_and_earlier_items() {
        let store = MemoryOrderStore::new();
        let oversized = u32::try_from(i32::MAX).unwrap() + 1;
        let broken = draft(1, 0, vec![item(2, 10), item(1, 5), item(oversized, 5)]);

        assert!(matches!(
            store.save(broken).await,
            Err(RepositoryError::Conflict(_))
        ));
        assert!(store.is_empty().await);
        assert!(store.find_by_id(OrderId::new(1)).await.unwrap().is_none());

        let saved = store.save(draft(1, 0, vec![item(1, 10)])).await.unwrap();
        assert_eq!(saved.id, OrderId::new(2));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_order_total_must_fit_storage() {
        let store = MemoryOrderStore::new();
        let mut huge = draft(1, 0, vec![item(1, 10)]);
        huge.total = MAX_ORDER_TOTAL + Decimal::ONE;

        assert!(matches!(
            store.save(huge).await,
            Err(RepositoryError::Conflict(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_catalog_rejects_price_above_maximum() {
        let store = MemoryCatalogStore::new();
        let mut yacht = input("Yacht", 0);
        yacht.price = MAX_PRICE + Decimal::ONE;

        let result = store.save(None, yacht).await;

        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_orders_by_user_are_newest_first_and_scoped() {
        let store = MemoryOrderStore::new();
        let older = store.save(draft(1, 30, vec![item(1, 10)])).await.unwrap();
        let newer = store.save(draft(1, 5, vec![item(1, 10)])).await.unwrap();
        store.save(draft(2, 1, vec![item(1, 10)])).await.unwrap();

        let mine = store.find_by_user(UserId::new(1)).await.unwrap();

        let ids: Vec<OrderId> = mine.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(store.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_status_reports_missing_order() {
        let store = MemoryOrderStore::new();
        let shipped = OrderStatus::from_stored(OrderStatus::SHIPPED.to_owned());

        assert!(
            store
                .update_status(OrderId::new(99), &shipped)
                .await
                .unwrap()
                .is_none()
        );

        let order = store.save(draft(1, 0, vec![item(1, 10)])).await.unwrap();
        let updated = store.update_status(order.id, &shipped).await.unwrap().unwrap();
        assert_eq!(updated.status.as_str(), OrderStatus::SHIPPED);
        assert_eq!(updated.items, order.items);
    }

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let store = MemoryUserStore::new();
        store.create("admin", "hash", Role::Admin).await.unwrap();

        let duplicate = store.create("admin", "other", Role::User).await;

        assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));
        let found = store.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(found.user.role, Role::Admin);
        assert_eq!(found.password_hash, "hash");
    }
}
