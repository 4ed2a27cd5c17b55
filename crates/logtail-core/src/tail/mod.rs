//! Rotation-tolerant, poll-based follower for a single log file.
//!
//! A [`FileTailer`] is a cursor over one path. Each call to
//! [`FileTailer::next_event`] waits until at least one line (or a transient
//! error) is available, polling the file every `poll_interval`.
//!
//! ## Cursor states
//!
//! ```text
//!            open ok
//!  REOPEN_PENDING ──────► OPEN ──► WATCHING ──┐
//!        ▲                                    │ replaced / removed,
//!        └────────────────────────────────────┘ old handle drained
//! ```
//!
//! - `REOPEN_PENDING`: no handle. The path is retried on every poll; a missing
//!   file is expected (the writer may not have started yet).
//! - `OPEN`: the handle is opened and its identity (device + inode on Unix)
//!   recorded.
//! - `WATCHING`: the handle is polled for growth. If the size drops below the
//!   read offset the file was truncated in place and reading restarts at 0.
//!   If the path now names a different file, or nothing, the old handle is
//!   read to its end and the cursor goes back to `REOPEN_PENDING`.
//!
//! The sequence ends (`None`) only after [`FileTailer::stop`] or when the file
//! stays missing for longer than the optional `reopen_timeout`.
//!
//! `next_event` is cancel-safe: the read offset only moves after a read has
//! completed, so dropping the future mid-poll loses nothing.

mod error;
mod identity;
mod lines;

use std::collections::VecDeque;
use std::io::SeekFrom;
use std::path::Path;
use std::time::Duration;

use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::{LogSource, TailEvent};
use crate::settings::{DEFAULT_MAX_LINE_BYTES, DEFAULT_MAX_READ_BYTES, DEFAULT_POLL_INTERVAL_MS};

pub use error::TailError;

use identity::FileIdentity;
use lines::LineBuffer;

/// Tunables for a single tailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailConfig {
    /// Delay between two polls when nothing new was found.
    pub poll_interval: Duration,
    /// Give up after the file has been missing this long. `None` waits forever.
    pub reopen_timeout: Option<Duration>,
    /// Unterminated lines longer than this are emitted in pieces.
    pub max_line_bytes: usize,
    /// Maximum bytes consumed by one poll.
    pub max_read_bytes: usize,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            reopen_timeout: None,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
        }
    }
}

/// An open handle on the file the path named when it was opened.
struct OpenCursor {
    file: File,
    identity: FileIdentity,
    /// Byte position of the next unread byte.
    offset: u64,
    /// The last bytes read, ending at `offset`. If they no longer match the
    /// file, it was truncated and rewritten past `offset` between polls.
    mark: Vec<u8>,
}

/// Length of the content fingerprint kept before the read offset.
const MARK_LEN: usize = 64;

impl OpenCursor {
    fn advance(&mut self, bytes: &[u8]) {
        self.offset += bytes.len() as u64;
        let tail = &bytes[bytes.len().saturating_sub(MARK_LEN)..];
        self.mark.extend_from_slice(tail);
        let excess = self.mark.len().saturating_sub(MARK_LEN);
        self.mark.drain(..excess);
    }

    fn rewind(&mut self) {
        self.offset = 0;
        self.mark.clear();
    }

    /// Whether the bytes before `offset` are still the ones that were read.
    async fn mark_holds(&mut self) -> std::io::Result<bool> {
        if self.mark.is_empty() {
            return Ok(true);
        }
        let start = self.offset - self.mark.len() as u64;
        let current = read_at(&mut self.file, start, self.mark.len()).await?;
        Ok(current == self.mark)
    }
}

enum CursorState {
    ReopenPending { since: Instant },
    Watching(OpenCursor),
    Stopped,
}

enum Progress {
    /// Nothing new; sleep before the next poll.
    Idle,
    /// State moved forward; poll again right away.
    Advanced,
    /// The sequence is over.
    Closed,
}

/// Follows one log file and yields its lines in append order.
///
/// Each session owns its own tailer; two tailers on the same path keep
/// independent offsets.
pub struct FileTailer {
    source: LogSource,
    config: TailConfig,
    state: CursorState,
    lines: LineBuffer,
    pending: VecDeque<TailEvent>,
    /// Last error reported, so a persistent condition is reported once.
    last_error: Option<String>,
}

impl FileTailer {
    /// Create a tailer. Nothing is opened until the first poll or snapshot.
    pub fn new(source: LogSource, config: TailConfig) -> Self {
        let lines = LineBuffer::new(config.max_line_bytes);
        Self {
            source,
            config,
            state: CursorState::ReopenPending {
                since: Instant::now(),
            },
            lines,
            pending: VecDeque::new(),
            last_error: None,
        }
    }

    pub const fn source(&self) -> &LogSource {
        &self.source
    }

    /// Whether a file handle is currently held.
    pub const fn is_watching(&self) -> bool {
        matches!(self.state, CursorState::Watching(_))
    }

    /// Current read offset, if a file is open.
    pub const fn offset(&self) -> Option<u64> {
        match &self.state {
            CursorState::Watching(cursor) => Some(cursor.offset),
            _ => None,
        }
    }

    /// Read everything currently in the file and continue tailing after it.
    ///
    /// Meant to be called once, before the first [`next_event`](Self::next_event).
    /// A missing file yields [`TailError::NotFound`]; the tailer stays usable
    /// and will pick the file up from its first byte once it appears.
    pub async fn snapshot(&mut self) -> Result<Vec<u8>, TailError> {
        if let CursorState::ReopenPending { .. } = self.state {
            let cursor = open_cursor(self.source.path()).await?;
            debug!(path = %self.source, "Tail: file opened for snapshot");
            self.state = CursorState::Watching(cursor);
        }

        let CursorState::Watching(cursor) = &mut self.state else {
            return Ok(Vec::new());
        };

        cursor
            .file
            .seek(SeekFrom::Start(0))
            .await
            .map_err(|e| TailError::io(self.source.path(), e))?;
        let mut content = Vec::new();
        cursor
            .file
            .read_to_end(&mut content)
            .await
            .map_err(|e| TailError::io(self.source.path(), e))?;

        cursor.rewind();
        cursor.advance(&content);
        self.lines.clear();
        Ok(content)
    }

    /// Wait for the next line or transient error.
    ///
    /// Returns `None` once the tail can no longer continue. Cancel-safe.
    pub async fn next_event(&mut self) -> Option<TailEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            match self.poll().await {
                Progress::Closed => return None,
                Progress::Advanced => {}
                Progress::Idle => {
                    if self.pending.is_empty() {
                        tokio::time::sleep(self.config.poll_interval).await;
                    }
                }
            }
        }
    }

    /// Release the file handle and end the sequence.
    pub fn stop(&mut self) {
        if !matches!(self.state, CursorState::Stopped) {
            debug!(path = %self.source, "Tail: cursor released");
        }
        self.state = CursorState::Stopped;
        self.pending.clear();
        self.lines.clear();
    }

    async fn poll(&mut self) -> Progress {
        match self.state {
            CursorState::Stopped => Progress::Closed,
            CursorState::ReopenPending { since } => self.poll_reopen(since).await,
            CursorState::Watching(_) => self.poll_watching().await,
        }
    }

    async fn poll_reopen(&mut self, since: Instant) -> Progress {
        match open_cursor(self.source.path()).await {
            Ok(cursor) => {
                info!(path = %self.source, "Tail: file opened");
                self.state = CursorState::Watching(cursor);
                self.last_error = None;
                Progress::Advanced
            }
            Err(err) => {
                if let Some(timeout) = self.config.reopen_timeout {
                    if since.elapsed() >= timeout {
                        warn!(
                            path = %self.source,
                            timeout_secs = timeout.as_secs_f64(),
                            "Tail: file did not reappear in time, giving up"
                        );
                        self.state = CursorState::Stopped;
                        return Progress::Closed;
                    }
                }
                if !err.is_not_found() {
                    self.report(err);
                }
                Progress::Idle
            }
        }
    }

    async fn poll_watching(&mut self) -> Progress {
        let CursorState::Watching(cursor) = &mut self.state else {
            return Progress::Idle;
        };
        let path = self.source.path();

        let replaced = match fs::metadata(path).await {
            Ok(meta) => FileIdentity::of(&meta) != cursor.identity,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                let err = TailError::io(path, e);
                self.report(err);
                return Progress::Idle;
            }
        };

        let len = match cursor.file.metadata().await {
            Ok(meta) => meta.len(),
            Err(e) => {
                let err = TailError::io(path, e);
                self.report(err);
                return Progress::Idle;
            }
        };

        let truncated = if replaced {
            false
        } else if len < cursor.offset {
            true
        } else {
            match cursor.mark_holds().await {
                Ok(holds) => !holds,
                Err(e) => {
                    let err = TailError::io(path, e);
                    self.report(err);
                    return Progress::Idle;
                }
            }
        };

        if truncated {
            info!(
                path = %self.source,
                old_offset = cursor.offset,
                new_size = len,
                "Tail: file truncated, restarting from the beginning"
            );
            cursor.rewind();
            self.lines.clear();
        }

        if len > cursor.offset {
            let available = len - cursor.offset;
            let limit = usize::try_from(available)
                .unwrap_or(usize::MAX)
                .min(self.config.max_read_bytes);

            match read_at(&mut cursor.file, cursor.offset, limit).await {
                Ok(bytes) if !bytes.is_empty() => {
                    cursor.advance(&bytes);
                    self.pending
                        .extend(self.lines.push(&bytes).into_iter().map(TailEvent::line));
                    self.last_error = None;
                    return Progress::Advanced;
                }
                // Shrunk between the size check and the read.
                Ok(_) => {}
                Err(e) => {
                    let err = TailError::io(path, e);
                    self.report(err);
                    return Progress::Idle;
                }
            }
        }

        if replaced {
            if let Some(rest) = self.lines.flush() {
                self.pending.push_back(TailEvent::line(rest));
            }
            info!(path = %self.source, "Tail: file rotated or removed, waiting to reopen");
            self.state = CursorState::ReopenPending {
                since: Instant::now(),
            };
            return Progress::Advanced;
        }

        Progress::Idle
    }

    fn report(&mut self, err: TailError) {
        let message = err.to_string();
        if self.last_error.as_deref() == Some(message.as_str()) {
            return;
        }
        debug!(path = %self.source, error = %message, "Tail: transient error");
        self.last_error = Some(message);
        self.pending.push_back(TailEvent::error(err));
    }
}

async fn open_cursor(path: &Path) -> Result<OpenCursor, TailError> {
    let file = File::open(path).await.map_err(|e| TailError::io(path, e))?;
    let meta = file.metadata().await.map_err(|e| TailError::io(path, e))?;
    if !meta.is_file() {
        return Err(TailError::NotAFile(path.to_path_buf()));
    }
    Ok(OpenCursor {
        file,
        identity: FileIdentity::of(&meta),
        offset: 0,
        mark: Vec::new(),
    })
}

/// Read up to `limit` bytes starting at `offset`.
async fn read_at(file: &mut File, offset: u64, limit: usize) -> std::io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(offset)).await?;
    let mut buf = Vec::with_capacity(limit);
    (&mut *file).take(limit as u64).read_to_end(&mut buf).await?;
    Ok(buf)
}
