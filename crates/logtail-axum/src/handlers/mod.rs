//! HTTP handlers.

pub mod log_ws;
pub mod root;

use axum::http::Uri;
use tracing::debug;

use crate::error::HttpError;

/// Fallback for paths that are neither `/` nor the log endpoint.
pub async fn not_found(uri: Uri) -> HttpError {
    debug!(path = %uri.path(), "Rejected request for unknown path");
    HttpError::NotFound("Invalid log path".to_string())
}
