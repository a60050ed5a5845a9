//! Notification dispatcher: persists, then routes to realtime and push.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use murmur_entity::notification::{Notification, NotificationKind, PushMessage};
use murmur_push::PushDeliveryClient;

use crate::connection::manager::{ConnectionManager, EmitOutcome};
use crate::message::types::OutboundEvent;
use crate::metrics::RealtimeMetrics;

use super::builder::{BuildError, NotificationBuilder};

/// Decides and initiates delivery of new notifications.
///
/// Persistence runs in the caller; delivery runs on tracked background
/// tasks so the triggering request never waits on a socket or push service.
#[derive(Debug)]
pub struct NotificationDispatcher {
    builder: NotificationBuilder,
    connections: Arc<ConnectionManager>,
    push: Arc<PushDeliveryClient>,
    metrics: Arc<RealtimeMetrics>,
    tracker: TaskTracker,
}

impl NotificationDispatcher {
    /// Create a dispatcher
    pub fn new(
        builder: NotificationBuilder,
        connections: Arc<ConnectionManager>,
        push: Arc<PushDeliveryClient>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            builder,
            connections,
            push,
            metrics,
            tracker: TaskTracker::new(),
        }
    }

    /// Persist a notification and schedule its delivery.
    ///
    /// The realtime emit is always scheduled. A push fan-out is scheduled
    /// as well when the recipient had no live session at decision time.
    /// Never fails: returns `None` when nothing was persisted.
    pub async fn dispatch(
        &self,
        recipient_id: i64,
        actor_id: i64,
        kind: NotificationKind,
        post_id: Option<i64>,
        comment_id: Option<i64>,
    ) -> Option<Notification> {
        let built = match self
            .builder
            .build_and_persist(recipient_id, actor_id, kind, post_id, comment_id)
            .await
        {
            Ok(built) => built,
            Err(BuildError::ActorMissing { actor_id }) => {
                self.metrics.actor_missing();
                warn!(
                    recipient_id = %recipient_id,
                    actor_id = %actor_id,
                    kind = %kind,
                    "Actor missing, notification dropped"
                );
                return None;
            }
            Err(BuildError::Store(e)) => {
                error!(
                    recipient_id = %recipient_id,
                    actor_id = %actor_id,
                    kind = %kind,
                    error = %e,
                    "Failed to persist notification"
                );
                return None;
            }
        };

        self.metrics.dispatched();
        let notification_id = built.notification.id;
        let online = self.connections.is_connected(recipient_id);

        debug!(
            notification_id = %notification_id,
            recipient_id = %recipient_id,
            online,
            "Dispatching notification"
        );

        let connections = self.connections.clone();
        let event = OutboundEvent::NewNotification(built.payload.clone());
        self.tracker.spawn(async move {
            match connections.emit(recipient_id, &event) {
                EmitOutcome::Delivered | EmitOutcome::NotConnected => {}
                EmitOutcome::Failed => {
                    warn!(
                        notification_id = %notification_id,
                        recipient_id = %recipient_id,
                        "Realtime delivery failed"
                    );
                }
            }
        });

        if !online {
            let push = self.push.clone();
            let metrics = self.metrics.clone();
            let message = PushMessage::new(push.notification_title(), built.payload);
            self.tracker.spawn(async move {
                let report = push.send_to_user(recipient_id, &message).await;
                metrics.record_push(&report);
                if report.attempted > 0 {
                    debug!(
                        notification_id = %notification_id,
                        recipient_id = %recipient_id,
                        delivered = report.delivered,
                        removed = report.removed,
                        failed = report.failed,
                        "Push fan-out finished"
                    );
                }
            });
        }

        Some(built.notification)
    }

    /// Number of delivery tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every scheduled delivery has finished.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Stop tracking new work and wait up to `grace` for in-flight deliveries.
    ///
    /// Returns `false` if the grace period elapsed first.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            info!(pending, "Waiting for in-flight notification deliveries");
        }
        match tokio::time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    pending = self.tracker.len(),
                    "Shutdown grace elapsed with deliveries in flight"
                );
                false
            }
        }
    }
}
