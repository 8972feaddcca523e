//! Song metadata endpoints, served by the song service.

use crate::error::{ApiError, ApiResult};
use crate::handlers::{IdQuery, request_body};
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use jukebox_core::{IdResponse, IdsResponse, SongMetadataDto, parse_id_set, parse_positive_id};
use jukebox_metadata::SongRow;

/// POST /songs
#[tracing::instrument(skip(state, body))]
pub async fn create_song(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<IdResponse>> {
    let body = request_body(body)?;
    let dto: SongMetadataDto = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed JSON request: {e}")))?;
    let song = dto.validate().map_err(ApiError::Validation)?;

    state.songs()?.create_song(&SongRow::new(&song)).await?;
    tracing::info!(song_id = song.id, "Song metadata created");
    Ok(Json(IdResponse { id: song.id }))
}

/// GET /songs/{id}
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SongMetadataDto>> {
    let id = parse_positive_id(&id)?;
    let row = state.songs()?.get_song(id).await?.ok_or_else(|| {
        ApiError::NotFound(format!("Song metadata with ID {id} does not exist."))
    })?;
    Ok(Json(row.to_metadata().to_dto()))
}

/// DELETE /songs?id=<csv>
pub async fn delete_songs(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<Json<IdsResponse>> {
    let ids = parse_id_set(&IdQuery::from_extracted(query)?)?;
    if ids.is_empty() {
        return Ok(Json(IdsResponse { ids: Vec::new() }));
    }

    let ids = state.songs()?.delete_songs(ids.as_slice()).await?;
    tracing::info!(count = ids.len(), "Song metadata deleted");
    Ok(Json(IdsResponse { ids }))
}
