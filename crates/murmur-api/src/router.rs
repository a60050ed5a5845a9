//! Route definitions for the Murmur HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket upgrade lives at `/ws`.

use axum::Router;
use axum::routing::{delete, get, post, put};

use crate::handlers;
use crate::state::AppState;

/// Build the route table. State and layers are applied by [`build_app`](crate::build_app).
pub fn build_router() -> Router<AppState> {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(push_routes())
        .merge(vapid_routes())
        .merge(realtime_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
}

/// Inbox listing, counters, read state, deletion
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications)
                .delete(handlers::notification::delete_all),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
        .route(
            "/notifications/{id}",
            delete(handlers::notification::delete_notification),
        )
}

/// Device registration and test pushes
fn push_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/push-subscriptions",
            post(handlers::push::subscribe).delete(handlers::push::unsubscribe),
        )
        .route("/push-subscriptions/test", post(handlers::push::send_test))
}

/// VAPID public key and diagnostics
fn vapid_routes() -> Router<AppState> {
    Router::new()
        .route("/vapid/public-key", get(handlers::vapid::public_key))
        .route("/vapid/debug", get(handlers::vapid::debug))
}

/// Realtime observability
fn realtime_routes() -> Router<AppState> {
    Router::new().route(
        "/realtime/connections",
        get(handlers::realtime::connections),
    )
}

/// Health checks
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
