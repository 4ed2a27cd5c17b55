//! Events flowing into a session.

use chrono::{DateTime, Utc};

use crate::tail::TailError;

/// One line produced by the tailer.
///
/// `text` never contains the trailing newline. `error` reports a transient
/// read problem seen while producing this event; the tail keeps going.
#[derive(Debug)]
pub struct TailEvent {
    pub text: String,
    pub error: Option<TailError>,
}

impl TailEvent {
    /// A complete line read from the file.
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: None,
        }
    }

    /// A transient error with no line attached.
    pub fn error(error: TailError) -> Self {
        Self {
            text: String::new(),
            error: Some(error),
        }
    }

    /// True when the event only reports an error and has no text to send.
    ///
    /// Empty lines without an error are real content and still count.
    pub fn is_error_only(&self) -> bool {
        self.error.is_some() && self.text.is_empty()
    }
}

/// A heartbeat timer firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatTick {
    /// Sequence number, starting at 1 for the first tick of a session.
    pub seq: u64,
    pub at: DateTime<Utc>,
}

impl HeartbeatTick {
    pub fn new(seq: u64) -> Self {
        Self { seq, at: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_line_is_content() {
        let event = TailEvent::line("");
        assert!(!event.is_error_only());
    }

    #[test]
    fn test_error_event_has_no_text() {
        let event = TailEvent::error(TailError::Io {
            path: "/tmp/x".into(),
            source: std::io::Error::other("boom"),
        });
        assert!(event.is_error_only());
        assert!(event.text.is_empty());
    }

    #[test]
    fn test_line_with_error_keeps_text() {
        let event = TailEvent {
            text: "partial".to_string(),
            error: Some(TailError::Io {
                path: "/tmp/x".into(),
                source: std::io::Error::other("boom"),
            }),
        };
        assert!(!event.is_error_only());
    }
}
