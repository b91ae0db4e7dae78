use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::core::errors::Error;
use crate::services::fs::resolve::is_missing;

/// Error body returned by every handler: `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidPath { source, .. } => status_for(source),
        Error::PathTraversal(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) | Error::NotADirectory(_) | Error::NotAFile(_) => StatusCode::NOT_FOUND,
        Error::Io(io) if is_missing(io) => StatusCode::NOT_FOUND,
        Error::Forbidden(_) => StatusCode::FORBIDDEN,
        Error::RootUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Io(_) | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = status_for(&err);
        let message = match err.root_cause() {
            Error::RootUnavailable(_) => {
                "the shared directory is currently unavailable, please contact the administrator"
                    .to_string()
            }
            _ => err.to_string(),
        };
        if status.is_server_error() {
            error!(error = %err, "request failed");
        }
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn store_errors_map_to_status_codes() {
        let traversal = Error::invalid_path("x", Error::PathTraversal("../x".into()));
        assert_eq!(status_for(&traversal), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&Error::NotAFile(PathBuf::from("/srv/dir"))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&Error::NotADirectory(PathBuf::from("/srv/f"))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&Error::Forbidden("no".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&Error::RootUnavailable(PathBuf::from("/srv"))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        let disk_full = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(
            status_for(&Error::invalid_path("big.iso", disk_full.into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn mkdir_through_a_file_is_not_found() {
        let through_file = std::io::Error::from(std::io::ErrorKind::NotADirectory);
        assert_eq!(
            status_for(&Error::invalid_path("README.txt/sub", through_file.into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn unavailable_root_gets_administrative_message() {
        let api = ApiError::from(Error::RootUnavailable(PathBuf::from("/mnt/share")));
        assert!(api.message.contains("administrator"));
        assert!(!api.message.contains("/mnt/share"));
    }
}
