//! VAPID key and diagnostics handlers.

use axum::Json;
use axum::extract::State;

use murmur_service::push::VapidDebugInfo;

use crate::dto::response::PublicKeyResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/vapid/public-key
pub async fn public_key(State(state): State<AppState>) -> Json<PublicKeyResponse> {
    Json(match state.push_service.public_key() {
        Some(key) => PublicKeyResponse {
            public_key: Some(key),
            error: None,
        },
        None => PublicKeyResponse {
            public_key: None,
            error: Some("VAPID not configured".to_string()),
        },
    })
}

/// GET /api/vapid/debug
pub async fn debug(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<VapidDebugInfo>, ApiError> {
    Ok(Json(state.push_service.debug(&auth).await?))
}
