//! WebSocket connection and realtime delivery tests.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use axum::http::StatusCode;

use crate::helpers::{TestApp, subscription_body};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr, token: &str) -> Socket {
    let (socket, _) = connect_async(format!("ws://{addr}/ws?token={token}"))
        .await
        .expect("WebSocket handshake failed");
    socket
}

/// Next JSON event, skipping transport frames.
async fn next_event(socket: &mut Socket) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for event")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("event is JSON");
        }
    }
}

/// Poll `check` until it holds or two seconds pass.
async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

async fn rejected_status(addr: SocketAddr, query: &str) -> u16 {
    match connect_async(format!("ws://{addr}/ws{query}")).await {
        Err(WsError::Http(response)) => response.status().as_u16(),
        Err(e) => panic!("unexpected handshake error: {e}"),
        Ok(_) => panic!("handshake should have been refused"),
    }
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_refused() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    assert_eq!(rejected_status(addr, "").await, 401);
    assert_eq!(rejected_status(addr, "?token=").await, 401);
    assert_eq!(rejected_status(addr, "?token=garbage").await, 401);

    assert_eq!(app.engine.connections.connected_users(), 0);
    assert_eq!(app.engine.metrics.snapshot().connections_rejected, 3);
}

#[tokio::test]
async fn test_connected_then_ping_pong() {
    let app = TestApp::new();
    let addr = app.spawn().await;
    let mut socket = connect(addr, &app.token(1)).await;

    let hello = next_event(&mut socket).await;
    assert_eq!(hello["event"], "connected");
    assert_eq!(hello["data"]["message"], app.config.realtime.connected_message);
    assert!(app.engine.connections.is_connected(1));
    assert!(!app.engine.connections.is_connected(2));

    socket
        .send(Message::text(r#"{"event":"ping"}"#))
        .await
        .unwrap();
    assert_eq!(next_event(&mut socket).await["event"], "pong");

    socket.send(Message::text("not json")).await.unwrap();
    let error = next_event(&mut socket).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["data"]["code"], "INVALID_MESSAGE");
}

#[tokio::test]
async fn test_online_recipient_gets_event_without_push() {
    let app = TestApp::new();
    let token = app.token(1);
    app.request(
        "POST",
        "/api/push-subscriptions",
        Some(subscription_body("https://push.example/bob")),
        Some(&token),
    )
    .await;

    let addr = app.spawn().await;
    let mut socket = connect(addr, &token).await;
    next_event(&mut socket).await;

    let response = app
        .request("GET", "/api/realtime/connections", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["connected_users"], 1);

    let notification = app.engine.notifier.on_like(2, 1, 42).await.unwrap();
    let event = next_event(&mut socket).await;
    app.engine.dispatcher.wait_idle().await;

    assert_eq!(event["event"], "new_notification");
    let data = &event["data"];
    assert_eq!(data["id"], notification.id);
    assert_eq!(data["type"], "like");
    assert_eq!(data["actor_username"], "alice");
    assert_eq!(data["actor_id"], 2);
    assert_eq!(data["post_id"], 42);
    assert!(data["comment_id"].is_null());
    assert_eq!(data["is_read"], false);
    assert_eq!(data["message"], "alice liked your post");
    assert!(data["created_at"].is_string());

    assert!(app.transport.endpoints().is_empty());
}

#[tokio::test]
async fn test_close_unregisters() {
    let app = TestApp::new();
    let addr = app.spawn().await;
    let mut socket = connect(addr, &app.token(1)).await;
    next_event(&mut socket).await;

    socket.close(None).await.unwrap();

    let connections = app.engine.connections.clone();
    assert!(eventually(|| !connections.is_connected(1)).await);
    assert_eq!(connections.connected_users(), 0);
}

#[tokio::test]
async fn test_newer_connection_survives_old_close() {
    let app = TestApp::new();
    let addr = app.spawn().await;
    let token = app.token(1);

    let mut first = connect(addr, &token).await;
    next_event(&mut first).await;
    let mut second = connect(addr, &token).await;
    next_event(&mut second).await;

    first.close(None).await.unwrap();
    let metrics = app.engine.metrics.clone();
    assert!(eventually(|| metrics.snapshot().connections_closed == 1).await);
    assert!(app.engine.connections.is_connected(1));

    app.engine.notifier.on_follow(3, 1).await.unwrap();
    let event = next_event(&mut second).await;
    assert_eq!(event["event"], "new_notification");
    assert_eq!(event["data"]["message"], "carol started following you");
}

#[tokio::test]
async fn test_connection_count_can_require_auth() {
    let mut config = TestApp::without_vapid().config;
    config.realtime.public_session_count = false;
    let app = TestApp::with_config(config);

    let response = app
        .request("GET", "/api/realtime/connections", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/realtime/connections", None, Some(&app.token(1)))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["connected_users"], 0);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");

    let response = app.request("GET", "/api/health/detailed", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["database"], "in-memory");
    assert_eq!(response.body["push_configured"], true);
    assert_eq!(response.body["connected_users"], 0);
    assert!(response.body["metrics"]["dispatches"].is_u64());
}
