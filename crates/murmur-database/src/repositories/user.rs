//! Read-only user lookups.

use async_trait::async_trait;
use sqlx::PgPool;

use murmur_core::error::{AppError, ErrorKind};
use murmur_core::result::AppResult;
use murmur_entity::user::UserSummary;

use crate::store::UserDirectory;

/// PostgreSQL-backed [`UserDirectory`].
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UserSummary>> {
        sqlx::query_as::<_, UserSummary>("SELECT id, username, is_verified FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn find_many(&self, ids: &[i64]) -> AppResult<Vec<UserSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, username, is_verified FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find users", e))
    }
}
