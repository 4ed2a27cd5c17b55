//! Axum-specific error types and mappings.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Path does not name the log endpoint.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Origin rejected by the acceptor policy.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HttpError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let response = HttpError::NotFound("Invalid log path".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = HttpError::Forbidden("origin".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_display() {
        let err = HttpError::NotFound("Invalid log path".into());
        assert_eq!(err.to_string(), "Not found: Invalid log path");
    }
}
