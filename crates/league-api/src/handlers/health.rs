//! Health check handler

use axum::{extract::State, Json};
use league_common::StorageBackend;
use league_service::dto::HealthResponse;

use crate::state::AppState;

/// Liveness probe
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage = match state.config().storage.backend {
        StorageBackend::Postgres => "postgres",
        StorageBackend::Memory => "memory",
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: storage.to_string(),
    })
}
