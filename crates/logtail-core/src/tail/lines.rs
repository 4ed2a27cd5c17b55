//! Splitting raw file bytes into lines.
//!
//! Bytes are kept raw until a line is complete so a multi-byte character
//! split across two reads still decodes. Decoding is lossy UTF-8.

/// Bytes after the last newline seen, waiting for the rest of their line.
#[derive(Debug)]
pub(crate) struct LineBuffer {
    partial: Vec<u8>,
    max_line_bytes: usize,
}

impl LineBuffer {
    pub(crate) const fn new(max_line_bytes: usize) -> Self {
        Self {
            partial: Vec::new(),
            max_line_bytes,
        }
    }

    /// Append freshly read bytes and return every line they complete.
    ///
    /// Returned lines have their `\n` stripped. An unterminated line that
    /// grows past `max_line_bytes` is returned in pieces.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let scan_from = self.partial.len();
        self.partial.extend_from_slice(bytes);

        let mut lines = Vec::new();
        let mut start = 0;
        for i in scan_from..self.partial.len() {
            if self.partial[i] == b'\n' {
                lines.push(decode(&self.partial[start..i]));
                start = i + 1;
            }
        }
        self.partial.drain(..start);

        while self.partial.len() > self.max_line_bytes {
            let cut = char_boundary(&self.partial, self.max_line_bytes);
            lines.push(decode(&self.partial[..cut]));
            self.partial.drain(..cut);
        }

        lines
    }

    /// Take whatever unterminated line is buffered.
    pub(crate) fn flush(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            return None;
        }
        let line = decode(&self.partial);
        self.partial.clear();
        Some(line)
    }

    pub(crate) fn clear(&mut self) {
        self.partial.clear();
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Largest cut point <= `max` that does not split a UTF-8 sequence.
fn char_boundary(bytes: &[u8], max: usize) -> usize {
    let mut cut = max;
    while cut > 0 && (bytes[cut] & 0xC0) == 0x80 {
        cut -= 1;
    }
    if cut == 0 { max } else { cut }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_lines_are_split() {
        let mut buffer = LineBuffer::new(1024);
        assert_eq!(buffer.push(b"a\nb\n"), vec!["a", "b"]);
        assert_eq!(buffer.flush(), None);
    }

    #[test]
    fn test_partial_line_waits_for_newline() {
        let mut buffer = LineBuffer::new(1024);
        assert!(buffer.push(b"par").is_empty());
        assert_eq!(buffer.push(b"tial\nnext"), vec!["partial"]);
        assert_eq!(buffer.flush(), Some("next".to_string()));
    }

    #[test]
    fn test_empty_lines_are_kept() {
        let mut buffer = LineBuffer::new(1024);
        assert_eq!(buffer.push(b"\n\nx\n"), vec!["", "", "x"]);
    }

    #[test]
    fn test_carriage_return_is_preserved() {
        let mut buffer = LineBuffer::new(1024);
        assert_eq!(buffer.push(b"dos\r\n"), vec!["dos\r"]);
    }

    #[test]
    fn test_multibyte_char_split_across_reads() {
        let mut buffer = LineBuffer::new(1024);
        let bytes = "héllo\n".as_bytes();
        assert!(buffer.push(&bytes[..2]).is_empty());
        assert_eq!(buffer.push(&bytes[2..]), vec!["héllo"]);
    }

    #[test]
    fn test_long_unterminated_line_is_split() {
        let mut buffer = LineBuffer::new(4);
        assert_eq!(buffer.push(b"abcdefghij"), vec!["abcd", "efgh"]);
        assert_eq!(buffer.push(b"\n"), vec!["ij"]);
    }

    #[test]
    fn test_long_line_split_respects_char_boundary() {
        let mut buffer = LineBuffer::new(4);
        // A cut at byte 4 would land inside "é".
        let pieces = buffer.push("aaaéb".as_bytes());
        assert_eq!(pieces, vec!["aaa"]);
        assert_eq!(buffer.flush(), Some("éb".to_string()));
    }

    #[test]
    fn test_clear_drops_partial() {
        let mut buffer = LineBuffer::new(1024);
        buffer.push(b"stale");
        buffer.clear();
        assert_eq!(buffer.push(b"fresh\n"), vec!["fresh"]);
    }
}
