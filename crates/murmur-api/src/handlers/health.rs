//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> (StatusCode, Json<DetailedHealthResponse>) {
    let (database, healthy) = match &state.db_pool {
        Some(pool) => match pool.health_check().await {
            Ok(true) => ("connected", true),
            _ => ("disconnected", false),
        },
        None => ("in-memory", true),
    };
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let engine = &state.realtime;
    (
        status,
        Json(DetailedHealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            database: database.to_string(),
            connected_users: engine.connections.connected_users(),
            push_configured: engine.push.is_configured(),
            deliveries_in_flight: engine.dispatcher.in_flight(),
            metrics: engine.metrics.snapshot(),
        }),
    )
}
