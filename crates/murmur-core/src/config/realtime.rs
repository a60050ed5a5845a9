//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound buffer (frames).
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Grace period after a missed interval before the connection is dropped.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    /// Acknowledgement text sent in the `connected` event.
    #[serde(default = "default_connected_message")]
    pub connected_message: String,
    /// Whether `GET /api/realtime/connections` is reachable without a token.
    #[serde(default = "default_true")]
    pub public_session_count: bool,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            ping_interval_seconds: default_ping_interval(),
            ping_timeout_seconds: default_ping_timeout(),
            connected_message: default_connected_message(),
            public_session_count: true,
        }
    }
}

fn default_channel_buffer() -> usize {
    64
}

fn default_ping_interval() -> u64 {
    25
}

fn default_ping_timeout() -> u64 {
    20
}

fn default_connected_message() -> String {
    "Connected to notification service".to_string()
}

fn default_true() -> bool {
    true
}
