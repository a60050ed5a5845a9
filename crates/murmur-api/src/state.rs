//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use murmur_auth::CredentialVerifier;
use murmur_core::config::AppConfig;
use murmur_database::DatabasePool;
use murmur_database::store::Stores;
use murmur_realtime::RealtimeEngine;
use murmur_service::{AccountService, NotificationService, PushSubscriptionService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Process start, for uptime reporting
    pub started_at: Instant,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool, absent with the in-memory provider
    pub db_pool: Option<DatabasePool>,
    /// Notification, subscription and user stores
    pub stores: Stores,

    // ── Auth & Realtime ──────────────────────────────────────
    /// Bearer token verifier for HTTP and WebSocket
    pub verifier: Arc<dyn CredentialVerifier>,
    /// WebSocket realtime engine
    pub realtime: RealtimeEngine,

    // ── Services ─────────────────────────────────────────────
    /// Caller account checks
    pub account_service: Arc<AccountService>,
    /// Notification inbox service
    pub notification_service: Arc<NotificationService>,
    /// Push subscription service
    pub push_service: Arc<PushSubscriptionService>,
}

impl AppState {
    /// Wire services on top of the stores and the realtime engine.
    pub fn new(
        config: AppConfig,
        stores: Stores,
        db_pool: Option<DatabasePool>,
        verifier: Arc<dyn CredentialVerifier>,
        realtime: RealtimeEngine,
    ) -> Self {
        let account_service = Arc::new(AccountService::new(Arc::clone(&stores.users)));
        let notification_service = Arc::new(NotificationService::new(
            Arc::clone(&stores.notifications),
            Arc::clone(&stores.users),
        ));
        let push_service = Arc::new(PushSubscriptionService::new(
            Arc::clone(&stores.subscriptions),
            Arc::clone(&realtime.push),
            config.push.clone(),
        ));

        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            db_pool,
            stores,
            verifier,
            realtime,
            account_service,
            notification_service,
            push_service,
        }
    }
}
