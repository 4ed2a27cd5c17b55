//! WebSocket upgrade handler for the log stream.
//!
//! `GET <endpoint>` upgrades the connection and runs one
//! [`logtail_core::Session`] over it:
//!
//! 1. The path is re-checked against the endpoint (`404` on mismatch) and the
//!    origin is checked against the acceptor policy (`403` on mismatch).
//! 2. Buffer sizes are applied and the connection is upgraded.
//! 3. The socket is split; the write half backs a [`WebSocketSink`].
//! 4. The session runs until the tail closes, a write fails, the client
//!    goes away or the server shuts down.

use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::http::{HeaderMap, Uri, header};
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use logtail_core::Session;
use tracing::{info, warn};

use crate::error::HttpError;
use crate::state::AppState;
use crate::ws_sink::{WebSocketSink, client_gone};

/// `GET <endpoint>`: upgrade and stream the configured log file.
pub async fn stream(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if !state.endpoint.matches(uri.path()) {
        return HttpError::NotFound("Invalid log path".to_string()).into_response();
    }

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    if !state.acceptor.origins.allows(origin) {
        warn!(origin = ?origin, "Rejected WebSocket upgrade from disallowed origin");
        return HttpError::Forbidden("Origin not allowed".to_string()).into_response();
    }

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            warn!(error = %rejection, "WebSocket upgrade failed");
            return rejection.into_response();
        }
    };

    state
        .acceptor
        .configure(upgrade)
        .on_failed_upgrade(|e| warn!(error = %e, "WebSocket handshake failed"))
        .on_upgrade(move |socket| run_session(socket, state))
}

async fn run_session(socket: WebSocket, state: AppState) {
    let (sender, receiver) = socket.split();
    let session = Session::new(
        state.endpoint.source.clone(),
        WebSocketSink::new(sender),
        state.session.clone(),
    );
    let session_id = session.id();

    info!(%session_id, path = %state.endpoint.source, "WebSocket client connected");

    let shutdown = state.shutdown.clone();
    let disconnect = async move {
        tokio::select! {
            () = client_gone(receiver) => {}
            () = shutdown.cancelled() => {}
        }
    };

    let outcome = session.run(disconnect).await;

    info!(%session_id, %outcome, "WebSocket client disconnected");
}
