//! WebSocket connection lifecycle.

pub mod handle;
pub mod heartbeat;
pub mod manager;
pub mod registry;
pub mod state;
