//! Session multiplexer.
//!
//! A [`Session`] owns one client connection and one tail cursor. It goes
//! through three phases:
//!
//! 1. **Starting**: the file content present at connect time is sent as a
//!    single frame. A failure here is logged and the session carries on.
//! 2. **Streaming**: tail events, heartbeat ticks and the client disconnect
//!    signal are awaited together; whichever is ready first is handled, one
//!    at a time, so writes reach the connection in arrival order.
//! 3. **Closing**: the heartbeat task and the tail cursor are released and
//!    the reason is returned as a [`SessionOutcome`]. Only a client
//!    disconnect gets a close handshake; after a closed tail or a failed
//!    write nothing more is sent.
//!
//! Transient tail errors are logged and streaming continues. A closed tail,
//! a failed write (line or heartbeat) or a client disconnect ends the
//! session. Nothing escapes the session: errors only reach the logs.

mod heartbeat;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{Instrument, debug, info, info_span, trace, warn};

use crate::domain::{LogSource, SessionId};
use crate::frame::Frame;
use crate::ports::{FrameSink, SinkError};
use crate::settings::DEFAULT_HEARTBEAT_INTERVAL_SECS;
use crate::tail::{FileTailer, TailConfig};

use heartbeat::Heartbeat;

/// Upper bound on the close handshake with a departing client.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Per-session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Delay between two pings.
    pub heartbeat_interval: Duration,
    pub tail: TailConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_INTERVAL_SECS),
            tail: TailConfig::default(),
        }
    }
}

/// Why a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The client went away.
    ClientDisconnected,
    /// The tail can no longer continue.
    TailClosed,
    /// Writing a log line failed.
    WriteFailed(SinkError),
    /// Writing a heartbeat failed.
    HeartbeatFailed(SinkError),
}

impl SessionOutcome {
    /// Whether the session ended because the connection broke.
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::WriteFailed(_) | Self::HeartbeatFailed(_))
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientDisconnected => write!(f, "client disconnected"),
            Self::TailClosed => write!(f, "tail closed"),
            Self::WriteFailed(err) => write!(f, "write failed: {err}"),
            Self::HeartbeatFailed(err) => write!(f, "heartbeat failed: {err}"),
        }
    }
}

/// One client watching one log file.
pub struct Session<S> {
    id: SessionId,
    source: LogSource,
    sink: S,
    config: SessionConfig,
}

impl<S: FrameSink> Session<S> {
    pub fn new(source: LogSource, sink: S, config: SessionConfig) -> Self {
        Self {
            id: SessionId::new(),
            source,
            sink,
            config,
        }
    }

    pub const fn id(&self) -> SessionId {
        self.id
    }

    pub const fn source(&self) -> &LogSource {
        &self.source
    }

    /// Stream the log until a fatal condition.
    ///
    /// `disconnect` must resolve when the client is gone; the adapter builds
    /// it from the read half of the connection.
    pub async fn run<D>(self, disconnect: D) -> SessionOutcome
    where
        D: Future<Output = ()> + Send,
    {
        let span = info_span!("session", session_id = %self.id, path = %self.source);
        self.stream(disconnect).instrument(span).await
    }

    async fn stream<D>(self, disconnect: D) -> SessionOutcome
    where
        D: Future<Output = ()> + Send,
    {
        let Self {
            source,
            mut sink,
            config,
            ..
        } = self;
        let mut tailer = FileTailer::new(source, config.tail);

        send_snapshot(&mut tailer, &mut sink).await;

        let (heartbeat, mut ticks) = Heartbeat::spawn(config.heartbeat_interval);
        tokio::pin!(disconnect);

        let outcome = loop {
            tokio::select! {
                event = tailer.next_event() => {
                    let Some(event) = event else {
                        warn!("Tail closed, log file might be deleted or unreadable");
                        break SessionOutcome::TailClosed;
                    };
                    if let Some(err) = &event.error {
                        warn!(error = %err, "Tail monitoring error");
                    }
                    if event.is_error_only() {
                        continue;
                    }
                    if let Err(err) = sink.send_frame(Frame::line(event.text)).await {
                        warn!(error = %err, "Log line write failed");
                        break SessionOutcome::WriteFailed(err);
                    }
                }
                Some(tick) = ticks.recv() => {
                    if let Err(err) = sink.send_frame(Frame::heartbeat()).await {
                        warn!(error = %err, seq = tick.seq, "Heartbeat write failed");
                        break SessionOutcome::HeartbeatFailed(err);
                    }
                    trace!(seq = tick.seq, at = %tick.at, "Heartbeat sent");
                }
                () = &mut disconnect => {
                    break SessionOutcome::ClientDisconnected;
                }
            }
        };

        drop(heartbeat);
        tailer.stop();
        if matches!(outcome, SessionOutcome::ClientDisconnected) {
            match tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => debug!(error = %err, "Connection close failed"),
                Err(_) => debug!("Connection close timed out"),
            }
        }

        info!(outcome = %outcome, "Session closed");
        outcome
    }
}

async fn send_snapshot<S: FrameSink>(tailer: &mut FileTailer, sink: &mut S) {
    match tailer.snapshot().await {
        Ok(content) if content.is_empty() => debug!("Log file empty at connect"),
        Ok(content) => match sink.send_frame(Frame::snapshot(&content)).await {
            Ok(()) => debug!(bytes = content.len(), "Initial log content sent"),
            Err(err) => warn!(error = %err, "Failed to send initial log content"),
        },
        Err(err) => warn!(error = %err, "Failed to read initial log content"),
    }
}
