//! Inbound and outbound WebSocket event definitions.
//!
//! Every frame is `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};

use murmur_entity::notification::NotificationPayload;

/// Events sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Sent once, right after a successful open.
    Connected {
        /// Greeting text.
        message: String,
    },
    /// A notification for the connected user.
    NewNotification(NotificationPayload),
    /// Reply to a client `ping`.
    Pong,
    /// The client sent something the server does not understand.
    Error {
        /// Machine-readable code.
        code: String,
        /// Description.
        message: String,
    },
}

impl OutboundEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::NewNotification(_) => "new_notification",
            Self::Pong => "pong",
            Self::Error { .. } => "error",
        }
    }

    /// Serialize to a text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Events sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Application-level keepalive; answered with `pong`.
    Ping,
}
