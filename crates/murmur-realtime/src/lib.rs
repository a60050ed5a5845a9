//! # murmur-realtime
//!
//! Real-time notification fan-out for Murmur. Provides:
//!
//! - The process-wide session registry (one live connection per user)
//! - WebSocket connection lifecycle with bearer authentication and heartbeat
//! - Notification building, message rendering, and realtime/push dispatch
//! - Self-notification suppression for social action triggers

pub mod connection;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::manager::{ConnectionManager, EmitOutcome};
pub use connection::registry::SessionRegistry;
pub use notification::dispatcher::NotificationDispatcher;
pub use notification::trigger::ActionNotifier;
pub use server::RealtimeEngine;
