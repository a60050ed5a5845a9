//! # murmur-service
//!
//! Request-scoped use cases behind the HTTP API: account checks, the
//! notification inbox and push subscription management. Services take their dependencies as
//! `Arc` references at construction time.

pub mod account;
pub mod context;
pub mod notification;
pub mod push;

pub use account::AccountService;
pub use context::RequestContext;
pub use notification::NotificationService;
pub use push::PushSubscriptionService;
