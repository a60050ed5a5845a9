//! Push subscription and VAPID API tests.

use axum::http::StatusCode;
use murmur_database::store::PushSubscriptionStore;

use crate::helpers::{TestApp, subscription_body};

const ENDPOINT: &str = "https://push.example/devices/bob-laptop";

#[tokio::test]
async fn test_subscribe_then_refresh() {
    let app = TestApp::new();
    let token = app.token(1);

    let response = app
        .request("POST", "/api/push-subscriptions", Some(subscription_body(ENDPOINT)), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["message"], "Subscribed");

    let response = app
        .request("POST", "/api/push-subscriptions", Some(subscription_body(ENDPOINT)), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Subscription updated");

    let debug = app
        .request("GET", "/api/vapid/debug", None, Some(&token))
        .await;
    assert_eq!(debug.body["subscription_count"], 1);
}

#[tokio::test]
async fn test_subscriptions_require_verified_account() {
    let app = TestApp::new();

    let response = app
        .request("POST", "/api/push-subscriptions", Some(subscription_body(ENDPOINT)), Some(&app.token(99)))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let unverified = app.token(4);
    let response = app
        .request("POST", "/api/push-subscriptions", Some(subscription_body(ENDPOINT)), Some(&unverified))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(app.store.list_for_user(4).await.unwrap().is_empty());

    let response = app
        .request("POST", "/api/push-subscriptions/test", None, Some(&unverified))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("GET", "/api/vapid/debug", None, Some(&unverified))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_subscribe_rejects_bad_input() {
    let app = TestApp::new();
    let token = app.token(1);

    let response = app
        .request(
            "POST",
            "/api/push-subscriptions",
            Some(subscription_body("not a url")),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");

    let response = app
        .request("POST", "/api/push-subscriptions", Some(subscription_body(ENDPOINT)), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unsubscribe() {
    let app = TestApp::new();
    let token = app.token(1);
    app.request("POST", "/api/push-subscriptions", Some(subscription_body(ENDPOINT)), Some(&token))
        .await;

    let response = app
        .request("DELETE", "/api/push-subscriptions", Some(subscription_body(ENDPOINT)), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Subscription deleted");

    let response = app
        .request("DELETE", "/api/push-subscriptions", Some(subscription_body(ENDPOINT)), Some(&token))
        .await;
    assert_eq!(response.body["message"], "No subscription found");
}

#[tokio::test]
async fn test_test_push_without_subscriptions() {
    let app = TestApp::new();

    let response = app
        .request("POST", "/api/push-subscriptions/test", None, Some(&app.token(1)))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], false);
    assert_eq!(
        response.body["message"],
        "No push subscriptions found for your account"
    );
    assert!(app.transport.endpoints().is_empty());
}

#[tokio::test]
async fn test_test_push_delivers_and_prunes_stale() {
    let app = TestApp::new();
    let token = app.token(1);
    let gone = "https://push.example/devices/bob-old-phone";
    for endpoint in [ENDPOINT, gone] {
        app.request("POST", "/api/push-subscriptions", Some(subscription_body(endpoint)), Some(&token))
            .await;
    }
    app.transport.respond(gone, 410);

    let response = app
        .request("POST", "/api/push-subscriptions/test", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["attempted"], 2);
    assert_eq!(response.body["delivered"], 1);
    assert_eq!(response.body["removed"], 1);

    let debug = app
        .request("GET", "/api/vapid/debug", None, Some(&token))
        .await;
    assert_eq!(debug.body["subscription_count"], 1);
    assert_eq!(debug.body["subscriptions"][0]["endpoint"], ENDPOINT);
}

#[tokio::test]
async fn test_offline_recipient_gets_push() {
    let app = TestApp::new();
    app.request(
        "POST",
        "/api/push-subscriptions",
        Some(subscription_body(ENDPOINT)),
        Some(&app.token(1)),
    )
    .await;

    app.engine.notifier.on_follow(2, 1).await.unwrap();
    app.engine.dispatcher.wait_idle().await;

    assert_eq!(app.transport.endpoints(), vec![ENDPOINT.to_string()]);
    assert_eq!(app.engine.metrics.snapshot().pushes_delivered, 1);
}

#[tokio::test]
async fn test_public_key() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/vapid/public-key", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["public_key"].as_str(),
        app.config.push.vapid_public_key.as_deref()
    );
    assert!(response.body.get("error").is_none());

    let app = TestApp::without_vapid();
    let response = app.request("GET", "/api/vapid/public-key", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["public_key"].is_null());
    assert_eq!(response.body["error"], "VAPID not configured");
}

#[tokio::test]
async fn test_vapid_debug() {
    let app = TestApp::without_vapid();

    let response = app.request("GET", "/api/vapid/debug", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/vapid/debug", None, Some(&app.token(3)))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["vapid_configured"], false);
    assert_eq!(response.body["vapid_public_key_set"], false);
    assert_eq!(response.body["vapid_private_key_set"], false);
    assert_eq!(response.body["vapid_subject"], "mailto:admin@example.com");
    assert_eq!(response.body["user_id"], 3);
    assert_eq!(response.body["subscription_count"], 0);
}
