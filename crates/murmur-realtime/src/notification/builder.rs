//! Turns a social action into a stored notification and its event payload.

use std::sync::Arc;

use thiserror::Error;

use murmur_core::error::AppError;
use murmur_database::store::{NotificationStore, UserDirectory};
use murmur_entity::notification::{
    NewNotification, Notification, NotificationKind, NotificationPayload,
};

use super::formatter::NotificationFormatter;

/// Why a notification could not be built.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The actor no longer exists; nothing was persisted.
    #[error("actor {actor_id} not found")]
    ActorMissing {
        /// The missing actor.
        actor_id: i64,
    },
    /// The store failed.
    #[error(transparent)]
    Store(#[from] AppError),
}

/// A persisted notification with its rendered delivery payload.
#[derive(Debug, Clone)]
pub struct BuiltNotification {
    /// The stored row.
    pub notification: Notification,
    /// Shared realtime/push payload.
    pub payload: NotificationPayload,
}

/// Persists notifications and renders their payloads.
///
/// Performs no self-notification check; callers suppress those.
#[derive(Debug, Clone)]
pub struct NotificationBuilder {
    notifications: Arc<dyn NotificationStore>,
    users: Arc<dyn UserDirectory>,
}

impl NotificationBuilder {
    /// Create a builder over the given stores.
    pub fn new(notifications: Arc<dyn NotificationStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            notifications,
            users,
        }
    }

    /// Persist a notification and package it for delivery.
    pub async fn build_and_persist(
        &self,
        recipient_id: i64,
        actor_id: i64,
        kind: NotificationKind,
        post_id: Option<i64>,
        comment_id: Option<i64>,
    ) -> Result<BuiltNotification, BuildError> {
        let actor = self
            .users
            .find_by_id(actor_id)
            .await?
            .ok_or(BuildError::ActorMissing { actor_id })?;

        let notification = self
            .notifications
            .create(&NewNotification {
                recipient_id,
                actor_id,
                kind,
                post_id,
                comment_id,
            })
            .await?;

        let message = NotificationFormatter::render(&notification.kind, &actor.username);
        let payload = NotificationPayload::from_notification(&notification, actor.username, message);

        Ok(BuiltNotification {
            notification,
            payload,
        })
    }
}
