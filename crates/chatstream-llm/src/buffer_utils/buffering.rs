use std::collections::VecDeque;

use crate::error::StreamError;

/// Byte buffer that splits a chunked body into lines.
///
/// Lines end at `\n`; a trailing `\r` is dropped. Nothing else is trimmed.
pub struct LineBuffer {
    buffer: VecDeque<u8>,
    // Bytes before this index hold no newline
    scanned: usize,
}

impl LineBuffer {
    /// Create a new buffer with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            scanned: 0,
        }
    }

    /// Add bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract next complete line from the buffer.
    /// Returns None if no complete line is available
    pub fn next_line(&mut self) -> Option<Result<String, StreamError>> {
        let newline_pos = match self.buffer.range(self.scanned..).position(|&b| b == b'\n') {
            Some(offset) => self.scanned + offset,
            None => {
                self.scanned = self.buffer.len();
                return None;
            }
        };

        let mut line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        self.scanned = 0;
        line_bytes.pop();

        Some(decode_line(line_bytes))
    }

    /// Drain whatever is left once the transport has ended.
    ///
    /// A body that does not end with a newline still has a last line.
    pub fn take_remainder(&mut self) -> Option<Result<String, StreamError>> {
        if self.buffer.is_empty() {
            return None;
        }

        let line_bytes: Vec<u8> = self.buffer.drain(..).collect();
        self.scanned = 0;
        Some(decode_line(line_bytes))
    }

    /// Current buffer size
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn decode_line(mut line_bytes: Vec<u8>) -> Result<String, StreamError> {
    if line_bytes.last() == Some(&b'\r') {
        line_bytes.pop();
    }

    String::from_utf8(line_bytes).map_err(|e| StreamError::Decode(e.utf8_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_basic() {
        let mut buffer = LineBuffer::with_capacity(64);

        buffer.extend(b"line1\nline2\n");

        assert_eq!(buffer.next_line().unwrap().unwrap(), "line1");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "line2");
        assert!(buffer.next_line().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_line() {
        let mut buffer = LineBuffer::with_capacity(64);

        buffer.extend(b"partial");
        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.len(), 7);

        buffer.extend(b" line\n");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "partial line");
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let mut buffer = LineBuffer::with_capacity(64);

        buffer.extend(b"data: a\r\n\r\n");

        assert_eq!(buffer.next_line().unwrap().unwrap(), "data: a");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "");
        assert!(buffer.next_line().is_none());
    }

    #[test]
    fn test_inner_whitespace_preserved() {
        let mut buffer = LineBuffer::with_capacity(64);

        buffer.extend(b"  data: x  \n");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "  data: x  ");
    }

    #[test]
    fn test_invalid_utf8_is_per_line() {
        let mut buffer = LineBuffer::with_capacity(64);

        buffer.extend(b"\xff\xfe\nok\n");

        assert!(matches!(buffer.next_line(), Some(Err(StreamError::Decode(_)))));
        assert_eq!(buffer.next_line().unwrap().unwrap(), "ok");
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let mut buffer = LineBuffer::with_capacity(64);
        let text = "héllo\n".as_bytes();

        buffer.extend(&text[..2]);
        assert!(buffer.next_line().is_none());
        buffer.extend(&text[2..]);
        assert_eq!(buffer.next_line().unwrap().unwrap(), "héllo");
    }

    #[test]
    fn test_take_remainder() {
        let mut buffer = LineBuffer::with_capacity(64);

        buffer.extend(b"first\nlast");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "first");
        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.take_remainder().unwrap().unwrap(), "last");
        assert!(buffer.take_remainder().is_none());
    }

    #[test]
    fn test_long_line_in_small_chunks() {
        let mut buffer = LineBuffer::with_capacity(8);
        let line = "x".repeat(10_000);

        for chunk in line.as_bytes().chunks(3) {
            buffer.extend(chunk);
            assert!(buffer.next_line().is_none());
        }
        assert_eq!(buffer.scanned, line.len());

        buffer.extend(b"\nnext\n");
        assert_eq!(buffer.next_line().unwrap().unwrap(), line);
        assert_eq!(buffer.next_line().unwrap().unwrap(), "next");
        assert_eq!(buffer.scanned, 0);
        assert!(buffer.next_line().is_none());
    }
}
