//! WebSocket-backed frame sink and disconnect detection.
//!
//! The socket is split: the write half becomes a [`WebSocketSink`] owned by
//! the session, the read half is drained by [`client_gone`] which resolves
//! once the browser is gone.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use logtail_core::{Frame, FrameSink, SinkError};
use tracing::debug;

/// Write half of a client connection.
pub struct WebSocketSink {
    sender: SplitSink<WebSocket, Message>,
}

impl WebSocketSink {
    pub fn new(sender: SplitSink<WebSocket, Message>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl FrameSink for WebSocketSink {
    async fn send_frame(&mut self, frame: Frame) -> Result<(), SinkError> {
        let message = match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Ping => Message::Ping(Bytes::new()),
        };
        self.sender
            .send(message)
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.sender
            .close()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))
    }
}

/// Resolve when the client closes the connection or the read half fails.
///
/// Inbound text, binary and pong frames are discarded.
pub async fn client_gone(mut receiver: SplitStream<WebSocket>) {
    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Close(frame)) => {
                debug!(?frame, "Client sent close frame");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "WebSocket read failed");
                return;
            }
        }
    }
    debug!("WebSocket stream ended");
}
