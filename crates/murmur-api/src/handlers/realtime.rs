//! Realtime observability handlers.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

use crate::dto::response::ConnectionsResponse;
use crate::error::ApiError;
use crate::extractors::auth::authenticate;
use crate::state::AppState;

/// GET /api/realtime/connections
///
/// Public unless `realtime.public_session_count` is off, in which case a
/// bearer token is required.
pub async fn connections(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ConnectionsResponse>, ApiError> {
    if !state.config.realtime.public_session_count {
        authenticate(&state, &headers).await?;
    }
    Ok(Json(ConnectionsResponse {
        connected_users: state.realtime.connections.connected_users(),
    }))
}
