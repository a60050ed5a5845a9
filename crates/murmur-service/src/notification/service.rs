//! Notification inbox for the authenticated user.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use murmur_core::error::AppError;
use murmur_core::types::pagination::PageRequest;
use murmur_database::store::{NotificationStore, UserDirectory};
use murmur_entity::notification::NotificationPayload;
use murmur_realtime::notification::formatter::NotificationFormatter;

use crate::context::RequestContext;

/// Display name used when an actor row is gone.
const UNKNOWN_ACTOR: &str = "unknown";

/// One page of the inbox with counters.
#[derive(Debug, Clone, Serialize)]
pub struct InboxPage {
    /// Newest first.
    pub notifications: Vec<NotificationPayload>,
    /// Matching notifications across all pages.
    pub total: u64,
    /// Unread notifications regardless of filter.
    pub unread_count: u64,
    /// Current page (1-based).
    pub page: u64,
    /// Page size.
    pub page_size: u64,
    /// `ceil(total / page_size)`, zero when empty.
    pub total_pages: u64,
}

/// Lists and mutates a recipient's notifications.
#[derive(Debug, Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationStore>,
    users: Arc<dyn UserDirectory>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(notifications: Arc<dyn NotificationStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            notifications,
            users,
        }
    }

    /// Lists notifications for the current user, rendered like delivered events.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        unread_only: bool,
    ) -> Result<InboxPage, AppError> {
        let rows = self
            .notifications
            .find_by_recipient(ctx.user_id, page, unread_only)
            .await?;
        let unread_count = self.notifications.count_unread(ctx.user_id).await?;

        let mut actor_ids: Vec<i64> = rows.items.iter().map(|n| n.actor_id).collect();
        actor_ids.sort_unstable();
        actor_ids.dedup();
        let names: HashMap<i64, String> = self
            .users
            .find_many(&actor_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        let rows = rows.map(|n| {
            let actor = names
                .get(&n.actor_id)
                .map(String::as_str)
                .unwrap_or(UNKNOWN_ACTOR);
            let message = NotificationFormatter::render(&n.kind, actor);
            NotificationPayload::from_notification(&n, actor, message)
        });

        Ok(InboxPage {
            notifications: rows.items,
            total: rows.total,
            unread_count,
            page: rows.page,
            page_size: rows.page_size,
            total_pages: rows.total_pages,
        })
    }

    /// Gets the unread notification count.
    pub async fn unread_count(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        self.notifications.count_unread(ctx.user_id).await
    }

    /// Marks one of the user's notifications as read.
    pub async fn mark_read(&self, ctx: &RequestContext, id: i64) -> Result<(), AppError> {
        if self.notifications.mark_read(id, ctx.user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Notification not found"))
        }
    }

    /// Marks all notifications as read for the current user.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        let updated = self.notifications.mark_all_read(ctx.user_id).await?;
        info!(user_id = %ctx.user_id, updated, "Marked all notifications read");
        Ok(updated)
    }

    /// Deletes one of the user's notifications.
    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<(), AppError> {
        if self.notifications.delete(id, ctx.user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Notification not found"))
        }
    }

    /// Deletes every notification of the current user.
    pub async fn delete_all(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        let deleted = self.notifications.delete_all(ctx.user_id).await?;
        info!(user_id = %ctx.user_id, deleted, "Deleted all notifications");
        Ok(deleted)
    }
}
