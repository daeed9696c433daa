//! Error types for the notes lookup service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Service-level errors that can occur during operation.
///
/// "No matching notes" is never an error; it is `SearchResult::None`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Notes file not found: {0}")]
    NotesFileNotFound(String),

    #[error("Failed to load notes: {0}")]
    NotesLoadError(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Service not ready")]
    NotReady,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::NotesFileNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::NotesLoadError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
