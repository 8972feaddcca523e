//! Resource endpoints: MP3 upload, download and bulk delete.

use crate::error::{ApiError, ApiResult};
use crate::handlers::{IdQuery, request_body};
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use jukebox_core::{AUDIO_MPEG, IdResponse, IdsResponse};

/// Check the declared media type. The payload itself is sniffed later.
fn require_audio_mpeg(headers: &HeaderMap) -> ApiResult<()> {
    let declared = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let essence = declared.split(';').next().unwrap_or("").trim();
    if essence.eq_ignore_ascii_case(AUDIO_MPEG) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Content-Type '{declared}' is not supported. Expected '{AUDIO_MPEG}'"
        )))
    }
}

/// POST /resources
#[tracing::instrument(skip_all)]
pub async fn upload_resource(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<IdResponse>> {
    require_audio_mpeg(&headers)?;
    let body = request_body(body)?;
    tracing::debug!(size = body.len(), "Upload received");
    let id = state.orchestrator()?.upload(body).await?;
    Ok(Json(IdResponse { id }))
}

/// GET /resources/{id}
pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let data = state.orchestrator()?.get(&id).await?;
    Ok((
        [
            (CONTENT_TYPE, AUDIO_MPEG.to_string()),
            (CONTENT_LENGTH, data.len().to_string()),
        ],
        data,
    )
        .into_response())
}

/// DELETE /resources?id=<csv>
pub async fn delete_resources(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<Json<IdsResponse>> {
    let csv = IdQuery::from_extracted(query)?;
    let ids = state.orchestrator()?.delete(&csv).await?;
    Ok(Json(IdsResponse { ids }))
}
