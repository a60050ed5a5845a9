//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::NotificationKind;

/// A persisted notification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: i64,
    /// The user who receives the notification.
    pub recipient_id: i64,
    /// The user whose action produced it.
    pub actor_id: i64,
    /// Stored kind (`follow`, `like`, `comment`, ...).
    pub kind: String,
    /// Post the action refers to, if any.
    pub post_id: Option<i64>,
    /// Comment the action refers to, if any.
    pub comment_id: Option<i64>,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// When the notification was created. Never updated.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Parsed kind, `None` for kinds this build does not know.
    pub fn parsed_kind(&self) -> Option<NotificationKind> {
        self.kind.parse().ok()
    }
}

/// Fields supplied when inserting a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// Recipient.
    pub recipient_id: i64,
    /// Actor.
    pub actor_id: i64,
    /// Kind.
    pub kind: NotificationKind,
    /// Referenced post.
    pub post_id: Option<i64>,
    /// Referenced comment.
    pub comment_id: Option<i64>,
}
