//! Frame sink port for the client connection.
//!
//! This port abstracts the write half of a client connection so the session
//! multiplexer can run against a WebSocket in production and an in-memory
//! channel in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::frame::Frame;

/// Errors returned when a frame cannot be written.
///
/// Every variant is fatal to the session that hit it.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The peer is gone.
    #[error("connection closed")]
    Closed,

    /// The transport failed while writing.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Write half of a client connection.
///
/// Writes are awaited one at a time by the owning session, so a slow client
/// suspends the session rather than dropping frames.
#[async_trait]
pub trait FrameSink: Send {
    /// Write one frame and wait until the transport accepted it.
    async fn send_frame(&mut self, frame: Frame) -> Result<(), SinkError>;

    /// Close the connection. Called once when the session ends.
    async fn close(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
