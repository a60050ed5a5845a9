//! Notification inbox handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use murmur_service::notification::InboxPage;

use crate::dto::request::InboxFilter;
use crate::dto::response::{CountResponse, SuccessResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<InboxFilter>,
) -> Result<Json<InboxPage>, ApiError> {
    let page = state
        .notification_service
        .list(&auth, params.into_page_request()?, filter.unread_only)
        .await?;
    Ok(Json(page))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state.notification_service.unread_count(&auth).await?;
    Ok(Json(CountResponse { count }))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.notification_service.mark_read(&auth, id).await?;
    Ok(Json(SuccessResponse::new("Notification marked as read")))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<SuccessResponse>, ApiError> {
    let updated = state.notification_service.mark_all_read(&auth).await?;
    Ok(Json(SuccessResponse {
        updated: Some(updated),
        ..SuccessResponse::new("All notifications marked as read")
    }))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.notification_service.delete(&auth, id).await?;
    Ok(Json(SuccessResponse::new("Notification deleted")))
}

/// DELETE /api/notifications
pub async fn delete_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<SuccessResponse>, ApiError> {
    let deleted = state.notification_service.delete_all(&auth).await?;
    Ok(Json(SuccessResponse {
        deleted: Some(deleted),
        ..SuccessResponse::new("All notifications deleted")
    }))
}
