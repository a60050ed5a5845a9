//! Request DTOs with validation.

use serde::Deserialize;
use validator::Validate;

use murmur_core::error::AppError;
use murmur_entity::push::{SubscriptionInfo, SubscriptionKeys};

/// Inbox filter, read alongside [`PaginationParams`](crate::extractors::PaginationParams).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct InboxFilter {
    /// Only unread notifications.
    #[serde(default)]
    pub unread_only: bool,
}

/// Browser subscription keys.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubscriptionKeysRequest {
    /// Client ECDH public key, base64url.
    #[validate(length(min = 1, message = "p256dh is required"))]
    pub p256dh: String,
    /// Client auth secret, base64url.
    #[validate(length(min = 1, message = "auth is required"))]
    pub auth: String,
}

/// `PushSubscription.toJSON()` body for subscribe and unsubscribe.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubscriptionRequest {
    /// Push service URL.
    #[validate(url(message = "endpoint must be a valid URL"))]
    pub endpoint: String,
    /// Key material.
    #[validate(nested)]
    pub keys: SubscriptionKeysRequest,
}

impl From<SubscriptionRequest> for SubscriptionInfo {
    fn from(req: SubscriptionRequest) -> Self {
        SubscriptionInfo {
            endpoint: req.endpoint,
            keys: SubscriptionKeys {
                p256dh: req.keys.p256dh,
                auth: req.keys.auth,
            },
        }
    }
}

/// Run `validator` rules and map failures to a validation error.
pub fn validated<T: Validate>(req: T) -> Result<T, AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    Ok(req)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(endpoint: &str, p256dh: &str) -> SubscriptionRequest {
        SubscriptionRequest {
            endpoint: endpoint.to_string(),
            keys: SubscriptionKeysRequest {
                p256dh: p256dh.to_string(),
                auth: "secret".to_string(),
            },
        }
    }

    #[test]
    fn test_subscription_validation() {
        assert!(validated(request("https://fcm.googleapis.com/fcm/send/abc", "key")).is_ok());
        assert!(validated(request("not a url", "key")).is_err());
        assert!(validated(request("https://push.example/a", "")).is_err());
    }

    #[test]
    fn test_into_info() {
        let info: SubscriptionInfo = request("https://push.example/a", "key").into();
        assert_eq!(info.endpoint, "https://push.example/a");
        assert_eq!(info.keys.p256dh, "key");
        assert_eq!(info.keys.auth, "secret");
    }
}
