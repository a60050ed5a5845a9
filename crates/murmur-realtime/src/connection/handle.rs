//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::state::{Authenticated, ConnectionState, StateCell};

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A frame queued for the socket writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// Serialized event JSON.
    Text(String),
    /// Transport-level keepalive ping.
    Ping,
}

/// Why a frame could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The connection is closed.
    #[error("connection closed")]
    Closed,
    /// The outbound buffer is full.
    #[error("send buffer full")]
    Full,
}

/// A handle to a single WebSocket connection.
///
/// The registry compares handles by [`ConnectionId`], never by user.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Authenticated owner
    pub user_id: i64,
    /// When the connection was opened
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<OutboundFrame>,
    state: StateCell,
    last_seen_ms: AtomicI64,
    closed: CancellationToken,
}

impl ConnectionHandle {
    /// Take over a verified attempt and move it to `Open`.
    pub fn new(auth: Authenticated, sender: mpsc::Sender<OutboundFrame>) -> Self {
        let now = Utc::now();
        let Authenticated { user_id, state } = auth;
        if !state.transition(ConnectionState::Open) {
            tracing::warn!(
                user_id = %user_id,
                state = ?state.get(),
                "Handle created from an unverified attempt"
            );
        }
        let closed = CancellationToken::new();
        if state.get() == ConnectionState::Closed {
            closed.cancel();
        }
        Self {
            id: Uuid::new_v4(),
            user_id,
            connected_at: now,
            sender,
            state,
            last_seen_ms: AtomicI64::new(now.timestamp_millis()),
            closed,
        }
    }

    /// Queue a frame without waiting.
    pub fn send(&self, frame: OutboundFrame) -> Result<(), SendError> {
        if !self.is_open() {
            return Err(SendError::Closed);
        }
        match self.sender.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Connection send buffer full, dropping frame");
                Err(SendError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                Err(SendError::Closed)
            }
        }
    }

    /// Queue a text frame.
    pub fn send_text(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.send(OutboundFrame::Text(text.into()))
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Check if the connection is open
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Move to `Closed` and wake [`closed`](Self::closed) waiters.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn mark_closed(&self) -> bool {
        let first = self.state.transition(ConnectionState::Closed);
        self.closed.cancel();
        first
    }

    /// Resolves once the handle is closed from any side.
    pub async fn closed(&self) {
        self.closed.cancelled().await
    }

    /// Record inbound traffic (any frame, including pongs).
    pub fn touch(&self) {
        self.last_seen_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Time of the most recent inbound traffic.
    pub fn last_seen(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_seen_ms.load(Ordering::Relaxed))
            .unwrap_or(self.connected_at)
    }
}
