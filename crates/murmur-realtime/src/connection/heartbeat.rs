//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use murmur_core::config::RealtimeConfig;

use super::handle::{ConnectionHandle, OutboundFrame, SendError};

/// Heartbeat configuration
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Allowed silence past one interval before the connection is dropped
    pub ping_timeout: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds.max(1)),
            ping_timeout: Duration::from_secs(config.ping_timeout_seconds),
        }
    }
}

/// Run the heartbeat loop for a connection.
///
/// Sends a transport ping every interval. Any inbound frame counts as a sign
/// of life; after `ping_interval + ping_timeout` of silence the handle is
/// closed, which ends the socket tasks.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval(config.ping_interval);
    interval.tick().await;
    let deadline = config.ping_interval + config.ping_timeout;

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            _ = interval.tick() => {}
        }

        let silent_for = (Utc::now() - handle.last_seen()).to_std().unwrap_or_default();
        if silent_for > deadline {
            tracing::warn!(
                conn_id = %handle.id,
                silent_ms = silent_for.as_millis() as u64,
                "Connection heartbeat timeout"
            );
            handle.mark_closed();
            break;
        }

        match handle.send(OutboundFrame::Ping) {
            Ok(()) => {}
            // Writer is backed up; the silence check still applies next tick.
            Err(SendError::Full) => {
                tracing::debug!(conn_id = %handle.id, "Send buffer full, skipping ping");
            }
            Err(SendError::Closed) => {
                tracing::debug!(conn_id = %handle.id, "Ping send failed, ending heartbeat");
                break;
            }
        }
    }

    tracing::debug!(conn_id = %handle.id, "Heartbeat loop ended");
}
