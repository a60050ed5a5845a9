//! # murmur-push
//!
//! Web Push delivery for Murmur: VAPID request signing, RFC 8291
//! `aes128gcm` payload encryption, an HTTP transport seam, and the
//! [`PushDeliveryClient`] that fans a message out to a user's devices.

pub mod client;
pub mod encryption;
pub mod error;
pub mod transport;
pub mod vapid;

pub use client::{DeliveryReport, PushDeliveryClient};
pub use error::PushError;
pub use transport::{PushRequest, PushTransport, ReqwestTransport};
pub use vapid::VapidSigner;
