//! In-memory store for tests and database-less local runs.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use murmur_core::result::AppResult;
use murmur_core::types::pagination::{PageRequest, PageResponse};
use murmur_entity::notification::{NewNotification, Notification};
use murmur_entity::push::{PushSubscription, SubscriptionInfo};
use murmur_entity::user::UserSummary;

use crate::store::{NotificationStore, PushSubscriptionStore, UserDirectory};

/// Implements every store trait over concurrent maps.
///
/// Users are owned by the account service, so they are seeded explicitly
/// with [`MemoryStore::insert_user`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<i64, UserSummary>,
    notifications: DashMap<i64, Notification>,
    subscriptions: DashMap<i64, PushSubscription>,
    /// `(user_id, endpoint)` → subscription id.
    endpoints: DashMap<(i64, String), i64>,
    next_notification_id: AtomicI64,
    next_subscription_id: AtomicI64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or rename a verified user.
    pub fn insert_user(&self, id: i64, username: impl Into<String>) {
        self.put_user(id, username.into(), true);
    }

    /// Seed a user who has not confirmed their email.
    pub fn insert_unverified_user(&self, id: i64, username: impl Into<String>) {
        self.put_user(id, username.into(), false);
    }

    fn put_user(&self, id: i64, username: String, is_verified: bool) {
        self.users.insert(
            id,
            UserSummary {
                id,
                username,
                is_verified,
            },
        );
    }

    /// Delete a user and cascade to their notifications and subscriptions.
    pub fn remove_user(&self, id: i64) {
        self.users.remove(&id);
        self.notifications
            .retain(|_, n| n.recipient_id != id && n.actor_id != id);
        self.subscriptions.retain(|_, s| s.user_id != id);
        self.endpoints.retain(|(user_id, _), _| *user_id != id);
    }

    /// Number of stored notifications across all users.
    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }

    fn recipient_rows(&self, recipient_id: i64, unread_only: bool) -> Vec<Notification> {
        let mut rows: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|e| e.recipient_id == recipient_id && (!unread_only || !e.is_read))
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, new: &NewNotification) -> AppResult<Notification> {
        let id = self.next_notification_id.fetch_add(1, Ordering::Relaxed) + 1;
        let row = Notification {
            id,
            recipient_id: new.recipient_id,
            actor_id: new.actor_id,
            kind: new.kind.as_str().to_string(),
            post_id: new.post_id,
            comment_id: new.comment_id,
            is_read: false,
            created_at: Utc::now(),
        };
        self.notifications.insert(id, row.clone());
        Ok(row)
    }

    async fn find_by_recipient(
        &self,
        recipient_id: i64,
        page: PageRequest,
        unread_only: bool,
    ) -> AppResult<PageResponse<Notification>> {
        let rows = self.recipient_rows(recipient_id, unread_only);
        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn count_unread(&self, recipient_id: i64) -> AppResult<u64> {
        Ok(self
            .notifications
            .iter()
            .filter(|e| e.recipient_id == recipient_id && !e.is_read)
            .count() as u64)
    }

    async fn mark_read(&self, id: i64, recipient_id: i64) -> AppResult<bool> {
        match self.notifications.get_mut(&id) {
            Some(mut row) if row.recipient_id == recipient_id => {
                row.is_read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_all_read(&self, recipient_id: i64) -> AppResult<u64> {
        let mut updated = 0;
        for mut row in self.notifications.iter_mut() {
            if row.recipient_id == recipient_id && !row.is_read {
                row.is_read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete(&self, id: i64, recipient_id: i64) -> AppResult<bool> {
        Ok(self
            .notifications
            .remove_if(&id, |_, row| row.recipient_id == recipient_id)
            .is_some())
    }

    async fn delete_all(&self, recipient_id: i64) -> AppResult<u64> {
        let before = self.notifications.len();
        self.notifications
            .retain(|_, row| row.recipient_id != recipient_id);
        Ok(before.saturating_sub(self.notifications.len()) as u64)
    }
}

#[async_trait]
impl PushSubscriptionStore for MemoryStore {
    async fn upsert(
        &self,
        user_id: i64,
        info: &SubscriptionInfo,
    ) -> AppResult<(PushSubscription, bool)> {
        match self.endpoints.entry((user_id, info.endpoint.clone())) {
            Entry::Occupied(entry) => {
                let id = *entry.get();
                let mut row = self.subscriptions.entry(id).or_insert_with(|| PushSubscription {
                    id,
                    user_id,
                    endpoint: info.endpoint.clone(),
                    p256dh: String::new(),
                    auth: String::new(),
                    created_at: Utc::now(),
                });
                row.p256dh = info.keys.p256dh.clone();
                row.auth = info.keys.auth.clone();
                Ok((row.clone(), false))
            }
            Entry::Vacant(entry) => {
                let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed) + 1;
                let row = PushSubscription {
                    id,
                    user_id,
                    endpoint: info.endpoint.clone(),
                    p256dh: info.keys.p256dh.clone(),
                    auth: info.keys.auth.clone(),
                    created_at: Utc::now(),
                };
                self.subscriptions.insert(id, row.clone());
                entry.insert(id);
                Ok((row, true))
            }
        }
    }

    async fn delete_by_endpoint(&self, user_id: i64, endpoint: &str) -> AppResult<bool> {
        match self.endpoints.remove(&(user_id, endpoint.to_string())) {
            Some((_, id)) => Ok(self.subscriptions.remove(&id).is_some()),
            None => Ok(false),
        }
    }

    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<PushSubscription>> {
        let mut rows: Vec<PushSubscription> = self
            .subscriptions
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by_key(|s| s.id);
        Ok(rows)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        match self.subscriptions.remove(&id) {
            Some((_, row)) => {
                self.endpoints.remove(&(row.user_id, row.endpoint));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UserSummary>> {
        Ok(self.users.get(&id).map(|user| user.value().clone()))
    }

    async fn find_many(&self, ids: &[i64]) -> AppResult<Vec<UserSummary>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|user| user.value().clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use murmur_entity::notification::NotificationKind;
    use murmur_entity::push::SubscriptionKeys;

    use super::*;

    fn new_like(recipient_id: i64, actor_id: i64) -> NewNotification {
        NewNotification {
            recipient_id,
            actor_id,
            kind: NotificationKind::Like,
            post_id: Some(42),
            comment_id: None,
        }
    }

    fn info(endpoint: &str, p256dh: &str) -> SubscriptionInfo {
        SubscriptionInfo {
            endpoint: endpoint.to_string(),
            keys: SubscriptionKeys {
                p256dh: p256dh.to_string(),
                auth: "auth".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_create_starts_unread() {
        let store = MemoryStore::new();
        let row = store.create(&new_like(1, 2)).await.unwrap();
        assert_eq!(row.kind, "like");
        assert!(!row.is_read);
        assert_eq!(store.count_unread(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_and_paged() {
        let store = MemoryStore::new();
        for _ in 0..5 {
            store.create(&new_like(1, 2)).await.unwrap();
        }
        store.create(&new_like(3, 2)).await.unwrap();

        let page = store
            .find_by_recipient(1, PageRequest::new(1, 2).unwrap(), false)
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 2);
        assert!(page.items[0].id > page.items[1].id);
    }

    #[tokio::test]
    async fn test_unread_filter_and_mark_all() {
        let store = MemoryStore::new();
        let first = store.create(&new_like(1, 2)).await.unwrap();
        store.create(&new_like(1, 2)).await.unwrap();

        assert!(store.mark_read(first.id, 1).await.unwrap());
        let unread = store
            .find_by_recipient(1, PageRequest::default(), true)
            .await
            .unwrap();
        assert_eq!(unread.total, 1);

        assert_eq!(store.mark_all_read(1).await.unwrap(), 1);
        assert_eq!(store.count_unread(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mutations_are_scoped_to_recipient() {
        let store = MemoryStore::new();
        let row = store.create(&new_like(1, 2)).await.unwrap();

        assert!(!store.mark_read(row.id, 99).await.unwrap());
        assert!(!NotificationStore::delete(&store, row.id, 99).await.unwrap());
        assert!(NotificationStore::delete(&store, row.id, 1).await.unwrap());
        assert_eq!(store.notification_count(), 0);
    }

    #[tokio::test]
    async fn test_upsert_is_keyed_on_user_and_endpoint() {
        let store = MemoryStore::new();
        let (first, created) = store.upsert(1, &info("https://push/a", "k1")).await.unwrap();
        assert!(created);

        let (second, created) = store.upsert(1, &info("https://push/a", "k2")).await.unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
        assert_eq!(second.p256dh, "k2");

        let (_, created) = store.upsert(2, &info("https://push/a", "k3")).await.unwrap();
        assert!(created);
        assert_eq!(store.list_for_user(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_by_id_frees_endpoint() {
        let store = MemoryStore::new();
        let (row, _) = store.upsert(1, &info("https://push/a", "k1")).await.unwrap();
        assert!(PushSubscriptionStore::delete(&store, row.id).await.unwrap());
        assert!(!store.delete_by_endpoint(1, "https://push/a").await.unwrap());

        let (_, created) = store.upsert(1, &info("https://push/a", "k1")).await.unwrap();
        assert!(created);
    }

    #[tokio::test]
    async fn test_seeded_users_carry_verification() {
        let store = MemoryStore::new();
        store.insert_user(1, "bob");
        store.insert_unverified_user(2, "alice");

        assert!(store.find_by_id(1).await.unwrap().unwrap().is_verified);
        assert!(!store.find_by_id(2).await.unwrap().unwrap().is_verified);
        assert_eq!(store.find_many(&[1, 2, 3]).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_user_cascades() {
        let store = MemoryStore::new();
        store.insert_user(2, "alice");
        store.create(&new_like(1, 2)).await.unwrap();
        store.upsert(2, &info("https://push/a", "k1")).await.unwrap();

        store.remove_user(2);
        assert!(store.find_by_id(2).await.unwrap().is_none());
        assert_eq!(store.notification_count(), 0);
        assert!(store.list_for_user(2).await.unwrap().is_empty());
    }
}
