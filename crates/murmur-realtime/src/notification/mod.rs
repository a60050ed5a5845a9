//! Notification building, rendering, dispatch, and action triggers.

pub mod builder;
pub mod dispatcher;
pub mod formatter;
pub mod trigger;
