//! `PostgreSQL` order store.
//!
//! An order and its items are written in one transaction; a failed item insert
//! rolls the whole order back.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopcart_core::{
    MAX_ORDER_TOTAL, NewOrder, Order, OrderId, OrderItem, OrderOwner, OrderStatus, ProductId,
    UserId,
};

use super::{OrderStore, RepositoryError, map_constraint};

const ORDER_COLUMNS: &str = r"
    SELECT o.id, o.user_id, u.username, o.status, o.total, o.created_at
    FROM shop.customer_order o
    JOIN shop.app_user u ON u.id = o.user_id
";

/// Internal row type for order headers.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    username: String,
    status: String,
    total: Decimal,
    created_at: DateTime<Utc>,
}

/// Internal row type for order items.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: i32,
    product_id: Option<i32>,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "order {} has item with quantity {}",
                row.order_id, row.quantity
            ))
        })?;

        Ok(Self {
            product_id: row.product_id.map(ProductId::new),
            product_name: row.product_name,
            quantity,
            unit_price: row.unit_price,
        })
    }
}

/// Orders backed by `shop.customer_order` and `shop.order_item`.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load items for the given headers and assemble full orders, keeping row order.
    async fn hydrate(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, product_id, product_name, quantity, unit_price
            FROM shop.order_item
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            let order_id = row.order_id;
            items.entry(order_id).or_default().push(row.try_into()?);
        }

        Ok(rows
            .into_iter()
            .map(|row| Order {
                id: OrderId::new(row.id),
                owner: OrderOwner {
                    id: UserId::new(row.user_id),
                    username: row.username,
                },
                created_at: row.created_at,
                status: OrderStatus::from_stored(row.status),
                total: row.total,
                items: items.remove(&row.id).unwrap_or_default(),
            })
            .collect())
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn save(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        if order.total > MAX_ORDER_TOTAL {
            return Err(RepositoryError::Conflict("order total too large".to_owned()));
        }

        let mut tx = self.pool.begin().await?;

        let order_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shop.customer_order (user_id, status, total, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(order.owner.id)
        .bind(order.status.as_str())
        .bind(order.total)
        .bind(order.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint(e, "order total must not be negative"))?;

        for (position, item) in order.items.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| RepositoryError::Conflict("too many order items".to_owned()))?;
            let quantity = i32::try_from(item.quantity)
                .map_err(|_| RepositoryError::Conflict("order item quantity too large".to_owned()))?;

            sqlx::query(
                r"
                INSERT INTO shop.order_item
                    (order_id, position, product_id, product_name, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(order_id)
            .bind(position)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_constraint(e, "order item quantity and price must be valid"))?;
        }

        tx.commit().await?;

        Ok(order.into_order(OrderId::new(order_id)))
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_COLUMNS} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![row]).await?.pop())
    }

    async fn find_by_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_COLUMNS} WHERE o.user_id = $1 ORDER BY o.created_at DESC, o.id DESC"
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_COLUMNS} ORDER BY o.created_at DESC, o.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: &OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let updated: Option<i32> = sqlx::query_scalar(
            r"
            UPDATE shop.customer_order
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id
            ",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(_) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn seed_user(pool: &PgPool) -> OrderOwner {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO shop.app_user (username, password_hash) VALUES ('user', 'x') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        OrderOwner {
            id: UserId::new(id),
            username: "user".to_owned(),
        }
    }

    fn item(product_id: Option<ProductId>, quantity: u32) -> OrderItem {
        OrderItem {
            product_id,
            product_name: "Cable".to_owned(),
            quantity,
            unit_price: Decimal::new(10, 0),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires running database (DATABASE_URL)"]
    async fn test_failed_item_insert_rolls_back_header(pool: PgPool) {
        let store = PgOrderStore::new(pool.clone());
        let owner = seed_user(&pool).await;
        let order = NewOrder {
            owner,
            created_at: Utc::now(),
            status: OrderStatus::pending(),
            total: Decimal::new(20, 0),
            // No product 999 exists, so the second insert fails its foreign key.
            items: vec![item(None, 1), item(Some(ProductId::new(999)), 1)],
        };

        assert!(store.save(order).await.is_err());

        let headers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.customer_order")
            .fetch_one(&pool)
            .await
            .unwrap();
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.order_item")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!((headers, items), (0, 0));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires running database (DATABASE_URL)"]
    async fn test_oversized_total_is_a_conflict(pool: PgPool) {
        let store = PgOrderStore::new(pool.clone());
        let owner = seed_user(&pool).await;
        let order = NewOrder {
            owner,
            created_at: Utc::now(),
            status: OrderStatus::pending(),
            total: MAX_ORDER_TOTAL + Decimal::ONE,
            items: vec![item(None, 1)],
        };

        assert!(matches!(store.save(order).await, Err(RepositoryError::Conflict(_))));
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
