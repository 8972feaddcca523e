//! API error types.

use crate::orchestrator::OrchestratorError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jukebox_client::ClientError;
use jukebox_core::FieldErrors;
use jukebox_metadata::MetadataError;
use serde::Serialize;
use tracing::error;

/// API error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error_message: String,
    /// Per-field validation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
    /// HTTP status code as a string.
    pub error_code: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation error")]
    Validation(FieldErrors),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Core(#[from] jukebox_core::Error),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Core(e) => match e {
                jukebox_core::Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Metadata(e) => match e {
                MetadataError::AlreadyExists(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Orchestrator(e) => match e {
                OrchestratorError::InvalidFormat | OrchestratorError::InvalidInput(_) => {
                    StatusCode::BAD_REQUEST
                }
                OrchestratorError::NotFound(_) => StatusCode::NOT_FOUND,
                OrchestratorError::SongService(ClientError::Conflict(_)) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error code for this error.
    pub fn code(&self) -> String {
        self.status_code().as_u16().to_string()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        let details = match &self {
            Self::Validation(details) => Some(details.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            error_message: self.to_string(),
            details,
            error_code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(jukebox_core::Error::EmptyIdList).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(MetadataError::AlreadyExists(3)).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(OrchestratorError::NotFound(3)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(OrchestratorError::SongService(ClientError::Conflict(3))).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(OrchestratorError::SongService(ClientError::Timeout(
                "5s".into()
            )))
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(OrchestratorError::InvalidFormat).code(),
            "400"
        );
    }

    #[test]
    fn test_error_body_shapes() {
        let plain = ErrorResponse {
            error_message: ApiError::from(OrchestratorError::NotFound(7)).to_string(),
            details: None,
            error_code: "404".into(),
        };
        assert_eq!(
            serde_json::to_value(&plain).unwrap(),
            serde_json::json!({
                "errorMessage": "Resource with ID 7 not found",
                "errorCode": "404"
            })
        );

        let mut details = FieldErrors::new();
        details.insert("year".into(), "Year must be between 1900 and 2099".into());
        let err = ApiError::Validation(details.clone());
        let body = ErrorResponse {
            error_message: err.to_string(),
            details: Some(details),
            error_code: err.code(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "errorMessage": "Validation error",
                "details": { "year": "Year must be between 1900 and 2099" },
                "errorCode": "400"
            })
        );
    }
}
