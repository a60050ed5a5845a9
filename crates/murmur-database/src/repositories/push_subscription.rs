//! Push subscription repository implementation.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use murmur_core::error::{AppError, ErrorKind};
use murmur_core::result::AppResult;
use murmur_entity::push::{PushSubscription, SubscriptionInfo};

use crate::store::PushSubscriptionStore;

/// Upsert result row; `inserted` is derived from the system column `xmax`.
#[derive(Debug, FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    subscription: PushSubscription,
    inserted: bool,
}

/// PostgreSQL-backed [`PushSubscriptionStore`].
#[derive(Debug, Clone)]
pub struct PushSubscriptionRepository {
    pool: PgPool,
}

impl PushSubscriptionRepository {
    /// Create a new push subscription repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PushSubscriptionStore for PushSubscriptionRepository {
    async fn upsert(
        &self,
        user_id: i64,
        info: &SubscriptionInfo,
    ) -> AppResult<(PushSubscription, bool)> {
        let row = sqlx::query_as::<_, UpsertRow>(
            "INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, endpoint) DO UPDATE \
             SET p256dh = EXCLUDED.p256dh, auth = EXCLUDED.auth \
             RETURNING id, user_id, endpoint, p256dh, auth, created_at, (xmax = 0) AS inserted",
        )
        .bind(user_id)
        .bind(&info.endpoint)
        .bind(&info.keys.p256dh)
        .bind(&info.keys.auth)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save subscription", e))?;

        Ok((row.subscription, row.inserted))
    }

    async fn delete_by_endpoint(&self, user_id: i64, endpoint: &str) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM push_subscriptions WHERE user_id = $1 AND endpoint = $2")
                .bind(user_id)
                .bind(endpoint)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to delete subscription", e)
                })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<PushSubscription>> {
        sqlx::query_as::<_, PushSubscription>(
            "SELECT id, user_id, endpoint, p256dh, auth, created_at \
             FROM push_subscriptions WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list subscriptions", e))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete subscription", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
