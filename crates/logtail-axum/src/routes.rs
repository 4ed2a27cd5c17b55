//! Route definitions and router construction.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the main router.
///
/// The endpoint route is registered verbatim; every other path falls through
/// to a JSON 404.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root::index))
        .route(&state.endpoint.route, get(handlers::log_ws::stream))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
