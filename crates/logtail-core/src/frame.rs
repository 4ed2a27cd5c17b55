//! Outbound frames.
//!
//! One input unit maps to exactly one frame: a tailed line, the connect-time
//! snapshot of the file, or a heartbeat. Nothing is batched or reordered here.

/// A single unit written to the client connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Log content shown to the viewer.
    Text(String),
    /// Keep-alive control frame. Never rendered as log text.
    Ping,
}

impl Frame {
    /// Encode one tailed line, restoring its line terminator.
    pub fn line(mut text: String) -> Self {
        text.push('\n');
        Self::Text(text)
    }

    /// Encode the file content present when the session started.
    ///
    /// Invalid UTF-8 is replaced, since text frames must be valid UTF-8.
    pub fn snapshot(content: &[u8]) -> Self {
        Self::Text(String::from_utf8_lossy(content).into_owned())
    }

    pub const fn heartbeat() -> Self {
        Self::Ping
    }

    /// Whether this is a protocol-level control frame.
    pub const fn is_control(&self) -> bool {
        matches!(self, Self::Ping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_appends_exactly_one_newline() {
        assert_eq!(Frame::line("line3".to_string()), Frame::Text("line3\n".into()));
        assert_eq!(Frame::line(String::new()), Frame::Text("\n".into()));
    }

    #[test]
    fn test_snapshot_is_verbatim() {
        let frame = Frame::snapshot(b"line1\nline2\n");
        assert_eq!(frame, Frame::Text("line1\nline2\n".into()));
    }

    #[test]
    fn test_snapshot_replaces_invalid_utf8() {
        let frame = Frame::snapshot(&[b'o', b'k', 0xff, b'\n']);
        assert_eq!(frame, Frame::Text("ok\u{fffd}\n".into()));
    }

    #[test]
    fn test_heartbeat_is_control() {
        assert!(Frame::heartbeat().is_control());
        assert!(!Frame::line("x".into()).is_control());
    }
}
