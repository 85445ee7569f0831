//! `PostgreSQL` user store.

use async_trait::async_trait;
use sqlx::PgPool;

use shopcart_core::{Role, User, UserId};

use super::{RepositoryError, UserCredentials, UserStore, map_constraint};

/// Internal row type for account queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    role: Role,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            role: row.role,
        }
    }
}

/// Internal row type for login lookups.
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    id: i32,
    username: String,
    role: Role,
    password_hash: String,
}

/// Accounts backed by `shop.app_user`.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT id, username, role, password_hash
            FROM shop.app_user
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserCredentials {
            user: User {
                id: UserId::new(r.id),
                username: r.username,
                role: r.role,
            },
            password_hash: r.password_hash,
        }))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, role FROM shop.app_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO shop.app_user (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, role
            ",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint(e, "username already exists"))?;

        Ok(row.into())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.app_user")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
