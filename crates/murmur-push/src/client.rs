//! Push delivery to every device of a user.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use murmur_core::config::PushConfig;
use murmur_core::error::AppError;
use murmur_database::store::PushSubscriptionStore;
use murmur_entity::notification::PushMessage;
use murmur_entity::push::PushSubscription;

use crate::encryption::{self, AUTH_SECRET_LEN, PUBLIC_KEY_LEN};
use crate::error::PushError;
use crate::transport::{PushRequest, PushTransport, ReqwestTransport};
use crate::vapid::VapidSigner;

/// Per-user fan-out tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    /// Subscriptions a send was attempted for.
    pub attempted: usize,
    /// Accepted by the push service.
    pub delivered: usize,
    /// Stale subscriptions deleted.
    pub removed: usize,
    /// Failed for any other reason.
    pub failed: usize,
}

/// Encrypts and POSTs push messages, pruning stale subscriptions.
#[derive(Debug, Clone)]
pub struct PushDeliveryClient {
    signer: Option<Arc<VapidSigner>>,
    transport: Arc<dyn PushTransport>,
    subscriptions: Arc<dyn PushSubscriptionStore>,
    limiter: Arc<Semaphore>,
    ttl_seconds: u32,
    title: String,
}

impl PushDeliveryClient {
    /// Build with the HTTP transport.
    pub fn new(
        config: &PushConfig,
        subscriptions: Arc<dyn PushSubscriptionStore>,
    ) -> Result<Self, AppError> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_seconds))?;
        Self::with_transport(config, subscriptions, Arc::new(transport))
    }

    /// Build with a caller-provided transport.
    pub fn with_transport(
        config: &PushConfig,
        subscriptions: Arc<dyn PushSubscriptionStore>,
        transport: Arc<dyn PushTransport>,
    ) -> Result<Self, AppError> {
        let signer = VapidSigner::from_config(config)?.map(Arc::new);
        if signer.is_none() {
            warn!("VAPID keys not configured, push delivery disabled");
        }
        Ok(Self {
            signer,
            transport,
            subscriptions,
            limiter: Arc::new(Semaphore::new(config.max_concurrent_sends.max(1))),
            ttl_seconds: config.ttl_seconds,
            title: config.notification_title.clone(),
        })
    }

    /// Whether a VAPID key pair is loaded.
    pub fn is_configured(&self) -> bool {
        self.signer.is_some()
    }

    /// The VAPID public key, if configured.
    pub fn public_key(&self) -> Option<&str> {
        self.signer.as_deref().map(VapidSigner::public_key)
    }

    /// Title used for device notifications.
    pub fn notification_title(&self) -> &str {
        &self.title
    }

    /// Encrypt `payload` for one subscription and POST it.
    pub async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), PushError> {
        let signer = self.signer.as_deref().ok_or(PushError::NotConfigured)?;

        let ua_public: [u8; PUBLIC_KEY_LEN] = decode_key(&subscription.p256dh, "p256dh")?;
        let auth: [u8; AUTH_SECRET_LEN] = decode_key(&subscription.auth, "auth")?;
        let authorization = signer.authorization(&subscription.endpoint)?;
        let body = encryption::encrypt(payload, &ua_public, &auth)?;

        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| PushError::failed("push limiter closed"))?;

        let status = self
            .transport
            .post(PushRequest {
                endpoint: subscription.endpoint.clone(),
                body,
                ttl_seconds: self.ttl_seconds,
                authorization,
            })
            .await?;

        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(PushError::from_status(status))
        }
    }

    /// Send `message` to every subscription of `user_id`.
    ///
    /// Each device is tried independently; stale ones are deleted. Never fails:
    /// problems are logged and counted in the report.
    pub async fn send_to_user(&self, user_id: i64, message: &PushMessage) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        if !self.is_configured() {
            warn!(user_id = %user_id, "Push not configured, skipping delivery");
            return report;
        }

        let subscriptions = match self.subscriptions.list_for_user(user_id).await {
            Ok(subs) => subs,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to load push subscriptions");
                return report;
            }
        };
        if subscriptions.is_empty() {
            debug!(user_id = %user_id, "No push subscriptions");
            return report;
        }

        let payload = match serde_json::to_vec(message) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to serialize push message");
                return report;
            }
        };

        let results = futures::future::join_all(
            subscriptions
                .iter()
                .map(|sub| {
                    let payload = &payload;
                    async move { (sub, self.send(sub, payload).await) }
                }),
        )
        .await;

        report.attempted = results.len();
        for (sub, result) in results {
            match result {
                Ok(()) => {
                    report.delivered += 1;
                    debug!(user_id = %user_id, subscription_id = sub.id, "Push delivered");
                }
                Err(err) if err.is_stale() => {
                    match self.subscriptions.delete(sub.id).await {
                        Ok(_) => {
                            report.removed += 1;
                            info!(
                                user_id = %user_id,
                                subscription_id = sub.id,
                                error = %err,
                                "Deleted stale push subscription"
                            );
                        }
                        Err(e) => {
                            report.failed += 1;
                            warn!(
                                subscription_id = sub.id,
                                error = %e,
                                "Failed to delete stale push subscription"
                            );
                        }
                    }
                }
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        user_id = %user_id,
                        subscription_id = sub.id,
                        error = %err,
                        "Push delivery failed"
                    );
                }
            }
        }

        report
    }
}

fn decode_key<const N: usize>(value: &str, name: &str) -> Result<[u8; N], PushError> {
    let raw = URL_SAFE_NO_PAD
        .decode(value.trim().trim_end_matches('='))
        .map_err(|e| PushError::InvalidSubscription(format!("{name} is not base64url: {e}")))?;
    raw.try_into()
        .map_err(|_| PushError::InvalidSubscription(format!("{name} must decode to {N} bytes")))
}
