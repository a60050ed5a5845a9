//! # murmur-entity
//!
//! Domain entity models for Murmur. Database rows derive `sqlx::FromRow`;
//! wire payloads are plain serde structs shared by the realtime and push
//! delivery paths.

pub mod notification;
pub mod push;
pub mod user;

pub use notification::{Notification, NotificationKind, NotificationPayload, PushMessage};
pub use push::{PushSubscription, SubscriptionInfo, SubscriptionKeys};
pub use user::UserSummary;
