//! Delivery payloads shared by the realtime and push paths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::Notification;

/// The `new_notification` event body, also embedded as `data` in pushes.
///
/// `post_id` and `comment_id` always serialize, as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Notification id.
    pub id: i64,
    /// Kind as stored.
    #[serde(rename = "type")]
    pub kind: String,
    /// Display name of the actor at build time.
    pub actor_username: String,
    /// Actor id.
    pub actor_id: i64,
    /// Referenced post.
    pub post_id: Option<i64>,
    /// Referenced comment.
    pub comment_id: Option<i64>,
    /// Read flag.
    pub is_read: bool,
    /// Creation time, ISO-8601.
    pub created_at: DateTime<Utc>,
    /// Rendered human-readable text.
    pub message: String,
}

impl NotificationPayload {
    /// Assemble a payload from a stored row plus its rendered text.
    pub fn from_notification(
        notification: &Notification,
        actor_username: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: notification.id,
            kind: notification.kind.clone(),
            actor_username: actor_username.into(),
            actor_id: notification.actor_id,
            post_id: notification.post_id,
            comment_id: notification.comment_id,
            is_read: notification.is_read,
            created_at: notification.created_at,
            message: message.into(),
        }
    }
}

/// JSON document encrypted into a Web Push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Device notification title.
    pub title: String,
    /// Device notification body.
    pub body: String,
    /// Same shape as the realtime event payload.
    pub data: NotificationPayload,
}

impl PushMessage {
    /// Wrap a payload, using its rendered message as the body.
    pub fn new(title: impl Into<String>, data: NotificationPayload) -> Self {
        Self {
            title: title.into(),
            body: data.message.clone(),
            data,
        }
    }
}
