//! HTTP and WebSocket integration tests against in-memory stores.

mod helpers;
mod notification_test;
mod push_test;
mod ws_test;
