//! `PostgreSQL` catalog store.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopcart_core::{Product, ProductId, ProductInput};

use super::{CatalogStore, RepositoryError, map_constraint};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    image_url: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
        }
    }
}

/// Catalog backed by the `shop.product` table.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url
            FROM shop.product
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url
            FROM shop.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn save(
        &self,
        id: Option<ProductId>,
        input: ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = match id {
            None => sqlx::query_as::<_, ProductRow>(
                r"
                INSERT INTO shop.product (name, description, price, image_url)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, description, price, image_url
                ",
            )
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.image_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_constraint(e, "product price must not be negative"))?,
            Some(id) => sqlx::query_as::<_, ProductRow>(
                r"
                UPDATE shop.product
                SET name = $2, description = $3, price = $4, image_url = $5,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id, name, description, price, image_url
                ",
            )
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.image_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_constraint(e, "product price must not be negative"))?
            .ok_or(RepositoryError::NotFound)?,
        };

        Ok(row.into())
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.product")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
