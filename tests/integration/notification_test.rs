//! Inbox API tests.

use axum::http::StatusCode;

use crate::helpers::TestApp;

async fn seed(app: &TestApp) {
    let notifier = &app.engine.notifier;
    notifier.on_follow(2, 1).await.unwrap();
    notifier.on_like(3, 1, 10).await.unwrap();
    notifier.on_comment(2, 1, 10, 20).await.unwrap();
    app.engine.dispatcher.wait_idle().await;
}

#[tokio::test]
async fn test_inbox_requires_token() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/notifications", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");

    let response = app
        .request("GET", "/api/notifications", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_inbox_requires_verified_account() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/notifications", None, Some(&app.token(99)))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "User not found");

    let unverified = app.token(4);
    for (method, path) in [
        ("GET", "/api/notifications"),
        ("GET", "/api/notifications/unread-count"),
        ("PUT", "/api/notifications/read-all"),
        ("DELETE", "/api/notifications/1"),
    ] {
        let response = app.request(method, path, None, Some(&unverified)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{method} {path}");
        assert_eq!(response.body["error"], "FORBIDDEN");
        assert_eq!(response.body["message"], "Please verify your email first");
    }
}

#[tokio::test]
async fn test_list_is_newest_first_with_counters() {
    let app = TestApp::new();
    seed(&app).await;
    let token = app.token(1);

    let response = app
        .request("GET", "/api/notifications?page=1&page_size=2", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = &response.body;
    assert_eq!(body["total"], 3);
    assert_eq!(body["unread_count"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["total_pages"], 2);

    let items = body["notifications"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["type"], "comment");
    assert_eq!(items[0]["message"], "alice commented on your post");
    assert_eq!(items[0]["comment_id"], 20);
    assert_eq!(items[1]["type"], "like");
    assert_eq!(items[1]["actor_username"], "carol");
    assert!(items[1]["comment_id"].is_null());
}

#[tokio::test]
async fn test_page_size_out_of_range() {
    let app = TestApp::new();
    let token = app.token(1);

    let response = app
        .request("GET", "/api/notifications?page_size=101", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("GET", "/api/notifications?page=0", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "GET",
            "/api/notifications?page=184467440737095516&page_size=100",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_empty_inbox() {
    let app = TestApp::new();
    let token = app.token(1);

    let response = app
        .request("GET", "/api/notifications", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 0);
    assert_eq!(response.body["total_pages"], 0);
}

#[tokio::test]
async fn test_mark_read_and_unread_filter() {
    let app = TestApp::new();
    seed(&app).await;
    let token = app.token(1);

    let list = app
        .request("GET", "/api/notifications", None, Some(&token))
        .await;
    let id = list.body["notifications"][0]["id"].as_i64().unwrap();

    let response = app
        .request("PUT", &format!("/api/notifications/{id}/read"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["message"], "Notification marked as read");

    let count = app
        .request("GET", "/api/notifications/unread-count", None, Some(&token))
        .await;
    assert_eq!(count.body["count"], 2);

    let unread = app
        .request("GET", "/api/notifications?unread_only=true", None, Some(&token))
        .await;
    assert_eq!(unread.body["total"], 2);
    assert!(
        unread.body["notifications"]
            .as_array()
            .unwrap()
            .iter()
            .all(|n| n["is_read"] == false)
    );
}

#[tokio::test]
async fn test_other_users_notification_is_not_found() {
    let app = TestApp::new();
    seed(&app).await;

    let list = app
        .request("GET", "/api/notifications", None, Some(&app.token(1)))
        .await;
    let id = list.body["notifications"][0]["id"].as_i64().unwrap();

    let intruder = app.token(2);
    let response = app
        .request("PUT", &format!("/api/notifications/{id}/read"), None, Some(&intruder))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("DELETE", &format!("/api/notifications/{id}"), None, Some(&intruder))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.notification_count(), 3);
}

#[tokio::test]
async fn test_bulk_read_and_delete() {
    let app = TestApp::new();
    seed(&app).await;
    let token = app.token(1);

    let response = app
        .request("PUT", "/api/notifications/read-all", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "All notifications marked as read");
    assert_eq!(response.body["updated"], 3);

    let list = app
        .request("GET", "/api/notifications", None, Some(&token))
        .await;
    let id = list.body["notifications"][0]["id"].as_i64().unwrap();
    let response = app
        .request("DELETE", &format!("/api/notifications/{id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Notification deleted");

    let response = app
        .request("DELETE", "/api/notifications", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["deleted"], 2);
    assert_eq!(app.store.notification_count(), 0);
}

#[tokio::test]
async fn test_self_actions_leave_inbox_empty() {
    let app = TestApp::new();
    assert!(app.engine.notifier.on_like(1, 1, 10).await.is_none());
    assert!(app.engine.notifier.on_follow(1, 1).await.is_none());

    let response = app
        .request("GET", "/api/notifications", None, Some(&app.token(1)))
        .await;
    assert_eq!(response.body["total"], 0);
}
