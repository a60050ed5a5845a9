//! Process-wide map of reachable users.

use std::sync::Arc;

use dashmap::DashMap;

use super::handle::ConnectionHandle;

/// `user_id → live connection`. At most one entry per user; the newest
/// connection wins.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<i64, Arc<ConnectionHandle>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `handle` the user's live connection, returning the one it replaced.
    pub fn register(&self, handle: Arc<ConnectionHandle>) -> Option<Arc<ConnectionHandle>> {
        self.sessions.insert(handle.user_id, handle)
    }

    /// Remove the entry only if it still points at `handle`.
    ///
    /// A stale handle closing after its user reconnected is a no-op.
    pub fn unregister(&self, handle: &ConnectionHandle) -> bool {
        self.sessions
            .remove_if(&handle.user_id, |_, current| current.id == handle.id)
            .is_some()
    }

    /// Whether the user has a live, open connection.
    pub fn is_connected(&self, user_id: i64) -> bool {
        self.sessions
            .get(&user_id)
            .is_some_and(|handle| handle.is_open())
    }

    /// The user's current connection.
    pub fn get(&self, user_id: i64) -> Option<Arc<ConnectionHandle>> {
        self.sessions.get(&user_id).map(|h| h.value().clone())
    }

    /// Number of connected users.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Remove and return every entry.
    pub fn drain(&self) -> Vec<Arc<ConnectionHandle>> {
        let user_ids: Vec<i64> = self.sessions.iter().map(|e| *e.key()).collect();
        user_ids
            .into_iter()
            .filter_map(|id| self.sessions.remove(&id).map(|(_, handle)| handle))
            .collect()
    }
}
