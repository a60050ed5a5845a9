//! Device registration, test pushes, and VAPID diagnostics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use murmur_core::config::PushConfig;
use murmur_core::error::AppError;
use murmur_database::store::PushSubscriptionStore;
use murmur_entity::notification::{NotificationPayload, PushMessage};
use murmur_entity::push::SubscriptionInfo;
use murmur_push::PushDeliveryClient;

use crate::context::RequestContext;

const TEST_MESSAGE: &str = "This is a test push notification!";
const ENDPOINT_PREVIEW_CHARS: usize = 50;

/// Outcome of `POST /api/push-subscriptions/test`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TestPushResult {
    /// At least one device accepted the message.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Subscriptions tried.
    pub attempted: usize,
    /// Accepted by the push service.
    pub delivered: usize,
    /// Stale subscriptions removed.
    pub removed: usize,
}

/// One subscription in the debug view.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionSummary {
    /// Subscription id.
    pub id: i64,
    /// Endpoint, shortened.
    pub endpoint: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// `GET /api/vapid/debug` body.
#[derive(Debug, Clone, Serialize)]
pub struct VapidDebugInfo {
    /// Both keys loaded.
    pub vapid_configured: bool,
    /// Public key present in config.
    pub vapid_public_key_set: bool,
    /// Private key present in config.
    pub vapid_private_key_set: bool,
    /// `sub` claim.
    pub vapid_subject: String,
    /// Caller.
    pub user_id: i64,
    /// Caller's device count.
    pub subscription_count: usize,
    /// Caller's devices.
    pub subscriptions: Vec<SubscriptionSummary>,
}

/// Manages the caller's push subscriptions.
#[derive(Debug, Clone)]
pub struct PushSubscriptionService {
    subscriptions: Arc<dyn PushSubscriptionStore>,
    push: Arc<PushDeliveryClient>,
    config: PushConfig,
}

impl PushSubscriptionService {
    /// Creates a new push subscription service.
    pub fn new(
        subscriptions: Arc<dyn PushSubscriptionStore>,
        push: Arc<PushDeliveryClient>,
        config: PushConfig,
    ) -> Self {
        Self {
            subscriptions,
            push,
            config,
        }
    }

    /// Register or refresh a device. Returns `true` when newly created.
    pub async fn subscribe(
        &self,
        ctx: &RequestContext,
        info: &SubscriptionInfo,
    ) -> Result<bool, AppError> {
        let (subscription, created) = self.subscriptions.upsert(ctx.user_id, info).await?;
        info!(
            user_id = %ctx.user_id,
            subscription_id = subscription.id,
            created,
            "Push subscription stored"
        );
        Ok(created)
    }

    /// Remove a device by endpoint. Returns `false` when none matched.
    pub async fn unsubscribe(&self, ctx: &RequestContext, endpoint: &str) -> Result<bool, AppError> {
        let removed = self
            .subscriptions
            .delete_by_endpoint(ctx.user_id, endpoint)
            .await?;
        if removed {
            info!(user_id = %ctx.user_id, "Push subscription deleted");
        }
        Ok(removed)
    }

    /// Push a synthetic notification to every device of the caller, synchronously.
    pub async fn send_test(&self, ctx: &RequestContext) -> Result<TestPushResult, AppError> {
        if self.subscriptions.list_for_user(ctx.user_id).await?.is_empty() {
            return Ok(TestPushResult {
                success: false,
                message: "No push subscriptions found for your account".to_string(),
                attempted: 0,
                delivered: 0,
                removed: 0,
            });
        }

        if !self.push.is_configured() {
            return Ok(TestPushResult {
                success: false,
                message: "VAPID not configured".to_string(),
                attempted: 0,
                delivered: 0,
                removed: 0,
            });
        }

        let payload = NotificationPayload {
            id: 0,
            kind: "test".to_string(),
            actor_username: "System".to_string(),
            actor_id: 0,
            post_id: None,
            comment_id: None,
            is_read: false,
            created_at: Utc::now(),
            message: TEST_MESSAGE.to_string(),
        };
        let message = PushMessage::new(self.push.notification_title(), payload);
        let report = self.push.send_to_user(ctx.user_id, &message).await;

        Ok(TestPushResult {
            success: report.delivered > 0,
            message: format!(
                "Test notification sent to {} of {} device(s)",
                report.delivered, report.attempted
            ),
            attempted: report.attempted,
            delivered: report.delivered,
            removed: report.removed,
        })
    }

    /// The VAPID public key browsers subscribe with.
    pub fn public_key(&self) -> Option<String> {
        self.push.public_key().map(str::to_string)
    }

    /// Push configuration and the caller's devices.
    pub async fn debug(&self, ctx: &RequestContext) -> Result<VapidDebugInfo, AppError> {
        let subscriptions: Vec<SubscriptionSummary> = self
            .subscriptions
            .list_for_user(ctx.user_id)
            .await?
            .into_iter()
            .map(|s| SubscriptionSummary {
                id: s.id,
                endpoint: preview(&s.endpoint),
                created_at: s.created_at,
            })
            .collect();
        let is_set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        Ok(VapidDebugInfo {
            vapid_configured: self.push.is_configured(),
            vapid_public_key_set: is_set(&self.config.vapid_public_key),
            vapid_private_key_set: is_set(&self.config.vapid_private_key),
            vapid_subject: self.config.vapid_subject.clone(),
            user_id: ctx.user_id,
            subscription_count: subscriptions.len(),
            subscriptions,
        })
    }
}

fn preview(endpoint: &str) -> String {
    match endpoint.char_indices().nth(ENDPOINT_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &endpoint[..idx]),
        None => endpoint.to_string(),
    }
}
