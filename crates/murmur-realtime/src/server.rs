//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use murmur_auth::CredentialVerifier;
use murmur_core::config::RealtimeConfig;
use murmur_database::store::Stores;
use murmur_push::PushDeliveryClient;

use crate::connection::manager::ConnectionManager;
use crate::connection::registry::SessionRegistry;
use crate::metrics::RealtimeMetrics;
use crate::notification::builder::NotificationBuilder;
use crate::notification::dispatcher::NotificationDispatcher;
use crate::notification::trigger::ActionNotifier;

/// Central real-time engine shared by the HTTP layer and action handlers.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Reachability map.
    pub registry: Arc<SessionRegistry>,
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Notification dispatcher.
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Self-action-suppressing trigger for action handlers.
    pub notifier: ActionNotifier,
    /// Push delivery client.
    pub push: Arc<PushDeliveryClient>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connected_users", &self.registry.count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(
        config: RealtimeConfig,
        stores: &Stores,
        verifier: Arc<dyn CredentialVerifier>,
        push: Arc<PushDeliveryClient>,
    ) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(SessionRegistry::new());
        let connections = Arc::new(ConnectionManager::new(
            config,
            registry.clone(),
            verifier,
            metrics.clone(),
        ));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            NotificationBuilder::new(stores.notifications.clone(), stores.users.clone()),
            connections.clone(),
            push.clone(),
            metrics.clone(),
        ));
        let notifier = ActionNotifier::new(dispatcher.clone());

        info!(push_configured = push.is_configured(), "Real-time engine initialized");

        Self {
            registry,
            connections,
            dispatcher,
            notifier,
            push,
            metrics,
        }
    }

    /// Close all connections, then wait up to `grace` for in-flight deliveries.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        info!("Shutting down real-time engine");
        self.connections.close_all();
        let drained = self.dispatcher.shutdown(grace).await;
        info!(drained, "Real-time engine shut down");
        drained
    }
}
