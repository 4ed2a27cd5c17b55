//! Liveness text at `/`.

use axum::extract::State;

use crate::state::AppState;

pub async fn index(State(state): State<AppState>) -> String {
    format!(
        "Log viewer backend is running. Connect to {} via WebSocket for logs.",
        state.endpoint.route
    )
}
