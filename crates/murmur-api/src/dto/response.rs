//! Response DTOs.

use serde::{Deserialize, Serialize};

use murmur_realtime::metrics::MetricsSnapshot;

/// `{message}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{success, message}` acknowledgement with an optional affected-row count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Always `true` on a 2xx.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Rows marked read, for bulk updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<u64>,
    /// Rows deleted, for bulk deletes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u64>,
}

impl SuccessResponse {
    /// Plain success.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            updated: None,
            deleted: None,
        }
    }
}

/// Count response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Count value.
    pub count: u64,
}

/// `GET /api/realtime/connections` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsResponse {
    /// Users with a live session.
    pub connected_users: usize,
}

/// `GET /api/vapid/public-key` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyResponse {
    /// Base64url uncompressed P-256 point, or null.
    pub public_key: Option<String>,
    /// Present when VAPID is not configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
    /// Database status.
    pub database: String,
    /// Users with a live realtime session.
    pub connected_users: usize,
    /// Whether VAPID keys are loaded.
    pub push_configured: bool,
    /// Deliveries still running in the background.
    pub deliveries_in_flight: usize,
    /// Realtime and push counters.
    pub metrics: MetricsSnapshot,
}
