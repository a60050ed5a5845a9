//! Realtime and delivery counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use murmur_push::DeliveryReport;

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_opened: AtomicU64,
    connections_rejected: AtomicU64,
    connections_closed: AtomicU64,
    messages_received: AtomicU64,
    events_emitted: AtomicU64,
    events_failed: AtomicU64,
    events_not_connected: AtomicU64,
    dispatches: AtomicU64,
    actors_missing: AtomicU64,
    pushes_delivered: AtomicU64,
    pushes_stale: AtomicU64,
    pushes_failed: AtomicU64,
}

fn inc(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl RealtimeMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// An authenticated connection was opened.
    pub fn connection_opened(&self) {
        inc(&self.connections_opened);
    }

    /// A connection attempt failed authentication.
    pub fn connection_rejected(&self) {
        inc(&self.connections_rejected);
    }

    /// An open connection was closed.
    pub fn connection_closed(&self) {
        inc(&self.connections_closed);
    }

    /// A client frame was received.
    pub fn message_received(&self) {
        inc(&self.messages_received);
    }

    /// An event was queued on a live connection.
    pub fn event_emitted(&self) {
        inc(&self.events_emitted);
    }

    /// Queuing an event on a live connection failed.
    pub fn event_failed(&self) {
        inc(&self.events_failed);
    }

    /// An emit found no live connection.
    pub fn event_not_connected(&self) {
        inc(&self.events_not_connected);
    }

    /// A notification was persisted and handed to delivery.
    pub fn dispatched(&self) {
        inc(&self.dispatches);
    }

    /// A dispatch was dropped because the actor no longer exists.
    pub fn actor_missing(&self) {
        inc(&self.actors_missing);
    }

    /// Fold a push fan-out result into the counters.
    pub fn record_push(&self, report: &DeliveryReport) {
        self.pushes_delivered
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.pushes_stale
            .fetch_add(report.removed as u64, Ordering::Relaxed);
        self.pushes_failed
            .fetch_add(report.failed as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            connections_opened: load(&self.connections_opened),
            connections_rejected: load(&self.connections_rejected),
            connections_closed: load(&self.connections_closed),
            messages_received: load(&self.messages_received),
            events_emitted: load(&self.events_emitted),
            events_failed: load(&self.events_failed),
            events_not_connected: load(&self.events_not_connected),
            dispatches: load(&self.dispatches),
            actors_missing: load(&self.actors_missing),
            pushes_delivered: load(&self.pushes_delivered),
            pushes_stale: load(&self.pushes_stale),
            pushes_failed: load(&self.pushes_failed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections opened
    pub connections_opened: u64,
    /// Connection attempts rejected
    pub connections_rejected: u64,
    /// Connections closed
    pub connections_closed: u64,
    /// Client frames received
    pub messages_received: u64,
    /// Events queued on a live connection
    pub events_emitted: u64,
    /// Events that failed on a live connection
    pub events_failed: u64,
    /// Emits that found the user offline
    pub events_not_connected: u64,
    /// Notifications dispatched
    pub dispatches: u64,
    /// Dispatches dropped for a missing actor
    pub actors_missing: u64,
    /// Push messages accepted by a push service
    pub pushes_delivered: u64,
    /// Stale push subscriptions removed
    pub pushes_stale: u64,
    /// Push messages that failed
    pub pushes_failed: u64,
}
