//! Account standing checks.

pub mod service;

pub use service::AccountService;
