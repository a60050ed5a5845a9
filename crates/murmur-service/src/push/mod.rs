//! Push subscription management.

pub mod service;

pub use service::{PushSubscriptionService, SubscriptionSummary, TestPushResult, VapidDebugInfo};
