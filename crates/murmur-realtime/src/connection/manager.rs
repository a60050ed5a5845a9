//! Connection manager: authentication, open/close, and event routing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use murmur_auth::CredentialVerifier;
use murmur_core::config::RealtimeConfig;
use murmur_core::error::AppError;

use crate::message::types::{InboundEvent, OutboundEvent};
use crate::metrics::RealtimeMetrics;

use super::handle::{ConnectionHandle, OutboundFrame};
use super::heartbeat::HeartbeatConfig;
use super::registry::SessionRegistry;
use super::state::{Authenticated, ConnectionAttempt};

/// Result of routing one event to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Queued on the user's live connection.
    Delivered,
    /// The user has no live connection. Expected, not an error.
    NotConnected,
    /// The live connection could not take the frame.
    Failed,
}

/// Owns the connection lifecycle on top of the [`SessionRegistry`].
#[derive(Debug)]
pub struct ConnectionManager {
    registry: Arc<SessionRegistry>,
    verifier: Arc<dyn CredentialVerifier>,
    metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        registry: Arc<SessionRegistry>,
        verifier: Arc<dyn CredentialVerifier>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            registry,
            verifier,
            metrics,
            config,
        }
    }

    /// Verify the `token` query parameter of a connection attempt.
    ///
    /// On failure the registry is untouched and the caller refuses the upgrade.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Authenticated, AppError> {
        let attempt = ConnectionAttempt::new();
        attempt.authenticating();
        debug!(state = ?attempt.state(), "Authenticating connection");

        let token = match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => t,
            None => {
                attempt.reject();
                self.metrics.connection_rejected();
                debug!(state = ?attempt.state(), "Connection rejected: missing token");
                return Err(AppError::authentication("Missing token"));
            }
        };

        match self.verifier.verify(token).await {
            Ok(user_id) => Ok(attempt.accept(user_id)),
            Err(e) => {
                attempt.reject();
                self.metrics.connection_rejected();
                debug!(state = ?attempt.state(), error = %e, "Connection rejected");
                Err(e)
            }
        }
    }

    /// Register an authenticated connection and greet it.
    ///
    /// Returns the handle and the receiver the socket writer drains.
    pub fn open(
        &self,
        auth: Authenticated,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundFrame>) {
        let user_id = auth.user_id;
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(auth, tx));

        if let Some(previous) = self.registry.register(handle.clone()) {
            debug!(
                user_id = %user_id,
                replaced = %previous.id,
                "Newer connection replaces previous session entry"
            );
        }
        self.metrics.connection_opened();

        let greeting = OutboundEvent::Connected {
            message: self.config.connected_message.clone(),
        };
        if !self.send_event(&handle, &greeting) {
            warn!(conn_id = %handle.id, "Failed to queue connected acknowledgement");
        }

        info!(conn_id = %handle.id, user_id = %user_id, "WebSocket connection opened");
        (handle, rx)
    }

    /// Close a connection and drop its registry entry if it is still current.
    pub fn close(&self, handle: &ConnectionHandle) {
        let first = handle.mark_closed();
        let removed = self.registry.unregister(handle);
        if first {
            self.metrics.connection_closed();
            info!(
                conn_id = %handle.id,
                user_id = %handle.user_id,
                unregistered = removed,
                "WebSocket connection closed"
            );
        }
    }

    /// Send `event` to the user's live connection, if any.
    pub fn emit(&self, user_id: i64, event: &OutboundEvent) -> EmitOutcome {
        let Some(handle) = self.registry.get(user_id) else {
            self.metrics.event_not_connected();
            debug!(user_id = %user_id, event = event.name(), "Recipient not connected");
            return EmitOutcome::NotConnected;
        };

        if self.send_event(&handle, event) {
            self.metrics.event_emitted();
            debug!(user_id = %user_id, conn_id = %handle.id, event = event.name(), "Event emitted");
            EmitOutcome::Delivered
        } else {
            self.metrics.event_failed();
            warn!(user_id = %user_id, conn_id = %handle.id, event = event.name(), "Event emit failed");
            EmitOutcome::Failed
        }
    }

    /// React to a text frame from the client.
    pub fn handle_inbound(&self, handle: &ConnectionHandle, raw: &str) {
        handle.touch();
        self.metrics.message_received();

        let reply = match serde_json::from_str::<InboundEvent>(raw) {
            Ok(InboundEvent::Ping) => OutboundEvent::Pong,
            Err(e) => {
                debug!(conn_id = %handle.id, error = %e, "Unrecognized client frame");
                OutboundEvent::Error {
                    code: "INVALID_MESSAGE".to_string(),
                    message: format!("Failed to parse message: {e}"),
                }
            }
        };
        self.send_event(handle, &reply);
    }

    /// Close every connection.
    pub fn close_all(&self) {
        let handles = self.registry.drain();
        for handle in &handles {
            if handle.mark_closed() {
                self.metrics.connection_closed();
            }
        }
        info!(count = handles.len(), "All connections closed");
    }

    /// Whether `user_id` currently has a live connection.
    pub fn is_connected(&self, user_id: i64) -> bool {
        self.registry.is_connected(user_id)
    }

    /// Number of connected users.
    pub fn connected_users(&self) -> usize {
        self.registry.count()
    }

    /// Heartbeat settings for new connections.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig::from(&self.config)
    }

    /// The shared registry.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    fn send_event(&self, handle: &ConnectionHandle, event: &OutboundEvent) -> bool {
        match event.to_json() {
            Ok(json) => handle.send_text(json).is_ok(),
            Err(e) => {
                warn!(conn_id = %handle.id, error = %e, "Failed to serialize outbound event");
                false
            }
        }
    }
}
