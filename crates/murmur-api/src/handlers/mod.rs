//! Route handlers organized by domain.

pub mod health;
pub mod notification;
pub mod push;
pub mod realtime;
pub mod vapid;
pub mod ws;
