//! Health check endpoint.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub role: &'static str,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    if let Some(orchestrator) = &state.orchestrator {
        orchestrator
            .store()
            .health_check()
            .await
            .map_err(|e| crate::error::ApiError::Internal(format!("storage unhealthy: {e}")))?;
    }
    if let Some(songs) = &state.songs {
        songs.health_check().await?;
    }

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        role: state.role.as_str(),
    }))
}
