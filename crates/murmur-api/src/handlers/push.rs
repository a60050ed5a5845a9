//! Push subscription handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use murmur_entity::push::SubscriptionInfo;
use murmur_service::push::TestPushResult;

use crate::dto::request::{SubscriptionRequest, validated};
use crate::dto::response::MessageResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/push-subscriptions
pub async fn subscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SubscriptionRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let info: SubscriptionInfo = validated(req)?.into();
    let created = state.push_service.subscribe(&auth, &info).await?;
    Ok(if created {
        (StatusCode::CREATED, Json(MessageResponse::new("Subscribed")))
    } else {
        (StatusCode::OK, Json(MessageResponse::new("Subscription updated")))
    })
}

/// DELETE /api/push-subscriptions
pub async fn unsubscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SubscriptionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state.push_service.unsubscribe(&auth, &req.endpoint).await?;
    let message = if removed {
        "Subscription deleted"
    } else {
        "No subscription found"
    };
    Ok(Json(MessageResponse::new(message)))
}

/// POST /api/push-subscriptions/test
pub async fn send_test(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<TestPushResult>, ApiError> {
    Ok(Json(state.push_service.send_test(&auth).await?))
}
