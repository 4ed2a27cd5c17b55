//! Application state for Axum handlers.

use std::sync::Arc;

use crate::bootstrap::AxumContext;

/// Shared state handed to every handler.
pub type AppState = Arc<AxumContext>;
