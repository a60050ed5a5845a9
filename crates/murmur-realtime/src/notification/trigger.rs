//! Entry points for social action handlers.

use std::sync::Arc;

use tracing::debug;

use murmur_entity::notification::{Notification, NotificationKind};

use super::dispatcher::NotificationDispatcher;

/// The single call site action handlers use to raise notifications.
///
/// Self-actions (actor == recipient) never reach the dispatcher.
#[derive(Debug, Clone)]
pub struct ActionNotifier {
    dispatcher: Arc<NotificationDispatcher>,
}

impl ActionNotifier {
    /// Wrap a dispatcher.
    pub fn new(dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// `follower` started following `followed`.
    pub async fn on_follow(&self, follower_id: i64, followed_id: i64) -> Option<Notification> {
        self.notify(followed_id, follower_id, NotificationKind::Follow, None, None)
            .await
    }

    /// `liker` liked a post owned by `post_owner`.
    pub async fn on_like(
        &self,
        liker_id: i64,
        post_owner_id: i64,
        post_id: i64,
    ) -> Option<Notification> {
        self.notify(
            post_owner_id,
            liker_id,
            NotificationKind::Like,
            Some(post_id),
            None,
        )
        .await
    }

    /// `commenter` commented on a post owned by `post_owner`.
    pub async fn on_comment(
        &self,
        commenter_id: i64,
        post_owner_id: i64,
        post_id: i64,
        comment_id: i64,
    ) -> Option<Notification> {
        self.notify(
            post_owner_id,
            commenter_id,
            NotificationKind::Comment,
            Some(post_id),
            Some(comment_id),
        )
        .await
    }

    async fn notify(
        &self,
        recipient_id: i64,
        actor_id: i64,
        kind: NotificationKind,
        post_id: Option<i64>,
        comment_id: Option<i64>,
    ) -> Option<Notification> {
        if actor_id == recipient_id {
            debug!(user_id = %actor_id, kind = %kind, "Self-action, no notification");
            return None;
        }
        self.dispatcher
            .dispatch(recipient_id, actor_id, kind, post_id, comment_id)
            .await
    }
}
