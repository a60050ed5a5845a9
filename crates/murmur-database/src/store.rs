//! Store traits consumed by the delivery pipeline and the HTTP layer.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use murmur_core::result::AppResult;
use murmur_core::types::pagination::{PageRequest, PageResponse};
use murmur_entity::notification::{NewNotification, Notification};
use murmur_entity::push::{PushSubscription, SubscriptionInfo};
use murmur_entity::user::UserSummary;

use crate::memory::MemoryStore;
use crate::repositories::{
    NotificationRepository, PushSubscriptionRepository, UserRepository,
};

/// Durable notification records, always scoped to their recipient.
#[async_trait]
pub trait NotificationStore: Send + Sync + Debug + 'static {
    /// Insert a new unread notification and return the stored row.
    async fn create(&self, new: &NewNotification) -> AppResult<Notification>;

    /// Newest-first page of a recipient's notifications.
    async fn find_by_recipient(
        &self,
        recipient_id: i64,
        page: PageRequest,
        unread_only: bool,
    ) -> AppResult<PageResponse<Notification>>;

    /// Number of unread notifications for a recipient.
    async fn count_unread(&self, recipient_id: i64) -> AppResult<u64>;

    /// Mark one notification read. `false` when it does not exist or is not the recipient's.
    async fn mark_read(&self, id: i64, recipient_id: i64) -> AppResult<bool>;

    /// Mark every unread notification read, returning how many changed.
    async fn mark_all_read(&self, recipient_id: i64) -> AppResult<u64>;

    /// Delete one notification. `false` when it does not exist or is not the recipient's.
    async fn delete(&self, id: i64, recipient_id: i64) -> AppResult<bool>;

    /// Delete all of a recipient's notifications, returning how many were removed.
    async fn delete_all(&self, recipient_id: i64) -> AppResult<u64>;
}

/// Registered push endpoints.
#[async_trait]
pub trait PushSubscriptionStore: Send + Sync + Debug + 'static {
    /// Insert or refresh keys for `(user_id, endpoint)`. The flag is `true` on insert.
    async fn upsert(
        &self,
        user_id: i64,
        info: &SubscriptionInfo,
    ) -> AppResult<(PushSubscription, bool)>;

    /// Remove a user's subscription by endpoint.
    async fn delete_by_endpoint(&self, user_id: i64, endpoint: &str) -> AppResult<bool>;

    /// All subscriptions of a user, oldest first.
    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<PushSubscription>>;

    /// Remove a subscription by id.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// Read access to accounts owned by the account service.
#[async_trait]
pub trait UserDirectory: Send + Sync + Debug + 'static {
    /// Look up one user.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UserSummary>>;

    /// Look up several users; missing ids are skipped.
    async fn find_many(&self, ids: &[i64]) -> AppResult<Vec<UserSummary>>;
}

/// The three stores, selected together from configuration.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Notification records.
    pub notifications: Arc<dyn NotificationStore>,
    /// Push subscriptions.
    pub subscriptions: Arc<dyn PushSubscriptionStore>,
    /// User lookups.
    pub users: Arc<dyn UserDirectory>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            notifications: Arc::new(NotificationRepository::new(pool.clone())),
            subscriptions: Arc::new(PushSubscriptionRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool)),
        }
    }

    /// Stores backed by a single in-memory instance.
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            notifications: store.clone(),
            subscriptions: store.clone(),
            users: store,
        }
    }
}
