//! Push subscription entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered device endpoint. Unique per `(user_id, endpoint)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PushSubscription {
    /// Unique subscription identifier.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Push service URL.
    pub endpoint: String,
    /// Client ECDH public key, base64url.
    #[serde(skip_serializing)]
    pub p256dh: String,
    /// Client auth secret, base64url.
    #[serde(skip_serializing)]
    pub auth: String,
    /// When the subscription was first stored.
    pub created_at: DateTime<Utc>,
}

impl PushSubscription {
    /// Key material in the browser's `PushSubscription.toJSON()` shape.
    pub fn info(&self) -> SubscriptionInfo {
        SubscriptionInfo {
            endpoint: self.endpoint.clone(),
            keys: SubscriptionKeys {
                p256dh: self.p256dh.clone(),
                auth: self.auth.clone(),
            },
        }
    }
}

/// Key material of a browser subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// Client ECDH public key, base64url.
    pub p256dh: String,
    /// Client auth secret, base64url.
    pub auth: String,
}

/// `{endpoint, keys: {p256dh, auth}}` as sent by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    /// Push service URL.
    pub endpoint: String,
    /// Key material.
    pub keys: SubscriptionKeys,
}
