//! Push delivery outcomes that are not plain success.

use thiserror::Error;

/// Why a single push send did not succeed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PushError {
    /// The push service reports the endpoint is gone (404/410). The caller deletes it.
    #[error("push subscription is stale (status {status})")]
    StaleSubscription {
        /// HTTP status returned by the push service.
        status: u16,
    },
    /// Transport error or any other non-success status. Logged, kept, not retried.
    #[error("push delivery failed: {reason}")]
    DeliveryFailed {
        /// Human-readable cause.
        reason: String,
    },
    /// Stored key material or endpoint cannot be used.
    #[error("invalid push subscription: {0}")]
    InvalidSubscription(String),
    /// No VAPID key pair is configured.
    #[error("push delivery is not configured")]
    NotConfigured,
}

impl PushError {
    /// Build a `DeliveryFailed` from any displayable cause.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::DeliveryFailed {
            reason: reason.into(),
        }
    }

    /// Classify a non-2xx push service status.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 | 410 => Self::StaleSubscription { status },
            other => Self::failed(format!("push service responded with status {other}")),
        }
    }

    /// Whether the subscription should be removed.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleSubscription { .. })
    }
}
