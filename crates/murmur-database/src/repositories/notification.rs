//! Notification repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use murmur_core::error::{AppError, ErrorKind};
use murmur_core::result::AppResult;
use murmur_core::types::pagination::{PageRequest, PageResponse};
use murmur_entity::notification::{NewNotification, Notification};

use crate::store::NotificationStore;

const COLUMNS: &str = "id, recipient_id, actor_id, kind, post_id, comment_id, is_read, created_at";

/// PostgreSQL-backed [`NotificationStore`].
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(&self, new: &NewNotification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications (recipient_id, actor_id, kind, post_id, comment_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        ))
        .bind(new.recipient_id)
        .bind(new.actor_id)
        .bind(new.kind.as_str())
        .bind(new.post_id)
        .bind(new.comment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create notification", e))
    }

    async fn find_by_recipient(
        &self,
        recipient_id: i64,
        page: PageRequest,
        unread_only: bool,
    ) -> AppResult<PageResponse<Notification>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications \
             WHERE recipient_id = $1 AND ($2 = FALSE OR is_read = FALSE)",
        )
        .bind(recipient_id)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count notifications", e))?;

        let rows = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE recipient_id = $1 AND ($2 = FALSE OR is_read = FALSE) \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(recipient_id)
        .bind(unread_only)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))?;

        Ok(PageResponse::new(rows, page, total.max(0) as u64))
    }

    async fn count_unread(&self, recipient_id: i64) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))?;
        Ok(count.max(0) as u64)
    }

    async fn mark_read(&self, id: i64, recipient_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND recipient_id = $2",
        )
        .bind(id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, recipient_id: i64) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64, recipient_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND recipient_id = $2")
            .bind(id)
            .bind(recipient_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete notification", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self, recipient_id: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE recipient_id = $1")
            .bind(recipient_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete notifications", e)
            })?;
        Ok(result.rows_affected())
    }
}
