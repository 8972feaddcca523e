//! HTTP request handlers.

pub mod health;
pub mod resources;
pub mod songs;

pub use health::*;
pub use resources::*;
pub use songs::*;

use crate::error::{ApiError, ApiResult};
use axum::body::Bytes;
use axum::extract::Query;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use serde::Deserialize;

/// `?id=<csv>` query of the bulk delete endpoints.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    /// The raw id list, or a 400 when the parameter is absent.
    pub fn required(self) -> ApiResult<String> {
        self.id.ok_or_else(|| {
            ApiError::BadRequest("Required request parameter 'id' is not present".to_string())
        })
    }

    /// Like [`IdQuery::required`], turning an unparseable query string into a 400.
    pub fn from_extracted(query: Result<Query<Self>, QueryRejection>) -> ApiResult<String> {
        let Query(query) =
            query.map_err(|e| ApiError::BadRequest(format!("Invalid query: {}", e.body_text())))?;
        query.required()
    }
}

/// Buffered request body, with oversized or unreadable bodies reported as a 400.
pub(crate) fn request_body(body: Result<Bytes, BytesRejection>) -> ApiResult<Bytes> {
    body.map_err(|e| ApiError::BadRequest(e.body_text()))
}
