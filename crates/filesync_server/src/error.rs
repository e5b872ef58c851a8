//! Sync server error types.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use filesync_core::CoreError;
use thiserror::Error;
use tracing::error;

/// Errors reported by the sync engine, mapped to HTTP status codes.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Missing, unknown or rotated access token")]
    Unauthorized,

    #[error("Administrator privilege required")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Checksum mismatch for '{path}': expected {expected}, stored {actual}")]
    Integrity {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Payload of {size} bytes exceeds the {limit} byte limit")]
    Capacity { size: u64, limit: u64 },

    #[error("Upload timed out and was discarded")]
    Timeout,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server misconfigured: {0}")]
    Internal(&'static str),
}

/// Result type alias for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

impl From<CoreError> for SyncError {
    fn from(e: CoreError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

impl From<JsonRejection> for SyncError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl SyncError {
    /// Machine-readable code used in the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Integrity { .. } => "integrity_error",
            Self::Capacity { .. } => "capacity_error",
            Self::Timeout => "timeout",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Database(_) | Self::Io(_) | Self::Internal(_) => "internal_error",
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Capacity { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Integrity { .. } | Self::Database(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Database(_) | Self::Io(_) | Self::Internal(_) => {
                error!("Internal error: {}", self);
                "Internal server error".to_string()
            }
            Self::Integrity { .. } => {
                error!("{}", self);
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = serde_json::json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message,
            }
        });
        (self.status(), axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(SyncError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(SyncError::NotFound("Folder").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            SyncError::Capacity { size: 2, limit: 1 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            SyncError::Conflict("rotated".into()).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_core_errors_are_invalid_requests() {
        let err: SyncError = CoreError::DuplicatePath("a.txt".into()).into();
        assert_eq!(err.code(), "invalid_request");
        assert!(err.to_string().contains("a.txt"));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = SyncError::Io(std::io::Error::other("disk on fire"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
