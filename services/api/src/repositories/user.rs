//! PostgreSQL user repository

use async_trait::async_trait;
use common::error::{DatabaseError, StoreError, StoreResult};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::UserStore;
use crate::{
    models::{NewUser, User},
    password::hash_password,
};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, new_user: &NewUser) -> StoreResult<User> {
        info!("Creating new user: {}", new_user.username);

        let password_hash = hash_password(&new_user.password)?;

        // Dropping the transaction without commit rolls the insert back
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Connection)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, is_active, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreError::from_insert(e, &new_user.username))
        .inspect_err(|e| {
            if matches!(e, StoreError::DuplicateUsername(_)) {
                warn!("Username already registered: {}", new_user.username);
            }
        })?;

        tx.commit().await.map_err(DatabaseError::Query)?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_active, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(user)
    }

    async fn list(&self, skip: i64, limit: i64) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_active, created_at, updated_at
            FROM users
            ORDER BY created_at, id
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(users)
    }

    async fn count(&self) -> StoreResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(total)
    }
}
