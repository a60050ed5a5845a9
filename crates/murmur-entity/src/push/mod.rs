//! Web Push subscription entities.

pub mod subscription;

pub use subscription::{PushSubscription, SubscriptionInfo, SubscriptionKeys};
