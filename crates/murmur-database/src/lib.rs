//! # murmur-database
//!
//! Storage for notifications and push subscriptions. The [`store`] traits
//! are what the rest of the workspace depends on; [`repositories`] backs
//! them with PostgreSQL and [`memory`] with process-local maps.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{NotificationStore, PushSubscriptionStore, Stores, UserDirectory};
