//! Line framing for the modem's receive stream.
//!
//! The modem terminates every line with `\r\n`, but partial reads can split a
//! line (or its terminator) anywhere. The codec accumulates bytes until a full
//! line is available and drops the blank lines between responses.
//!
//! A line longer than [`MAX_LINE_LENGTH`] is discarded up to its terminator.

use bytes::BytesMut;
use tracing::warn;

/// Initial buffer size; enough for any single-line response except an
/// operator scan, which is decoded byte by byte instead.
pub const LINE_CAPACITY: usize = 256;

/// Maximum length of a single line, in bytes.
pub const MAX_LINE_LENGTH: usize = 1024;

/// Accumulates received bytes and splits them into lines.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Bytes of the line being received.
    buffer: BytesMut,
    /// Length of the unterminated line at the end of `buffer`.
    pending: usize,
    /// Dropping the rest of an oversized line.
    discarding: bool,
}

impl LineCodec {
    /// Create an empty codec.
    pub fn new() -> Self {
        LineCodec {
            buffer: BytesMut::with_capacity(LINE_CAPACITY),
            pending: 0,
            discarding: false,
        }
    }

    /// Add received data to the buffer.
    ///
    /// Terminators that arrive while no line is pending are dropped, so the
    /// buffer always starts with the first byte of a line. A line that grows
    /// past [`MAX_LINE_LENGTH`] is dropped along with everything up to its
    /// terminator.
    pub fn push(&mut self, data: &[u8]) {
        for &byte in data {
            let terminator = is_terminator(byte);
            if self.discarding {
                self.discarding = !terminator;
                continue;
            }
            if self.buffer.is_empty() && terminator {
                continue;
            }
            if terminator {
                self.pending = 0;
            } else if self.pending >= MAX_LINE_LENGTH {
                warn!(max = MAX_LINE_LENGTH, "line too long, discarding");
                let keep = self.buffer.len() - self.pending;
                self.buffer.truncate(keep);
                self.pending = 0;
                self.discarding = true;
                continue;
            } else {
                self.pending += 1;
            }
            self.buffer.extend_from_slice(&[byte]);
        }
    }

    /// Take the next complete line, without its terminator.
    ///
    /// Returns `None` if more data is needed.
    pub fn decode_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|&b| is_terminator(b))?;
        let line_data = self.buffer.split_to(end);
        let line = String::from_utf8_lossy(&line_data).to_string();

        let skip = self.buffer.iter().take_while(|&&b| is_terminator(b)).count();
        let _ = self.buffer.split_to(skip);
        Some(line)
    }

    /// Bytes of the incomplete line received so far.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Discard any partial line.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pending = 0;
        self.discarding = false;
    }
}

fn is_terminator(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_lines() {
        let mut codec = LineCodec::new();
        codec.push(b"+CREG: 1\r\n\r\nOK\r\n");

        assert_eq!(codec.decode_line(), Some("+CREG: 1".to_string()));
        assert_eq!(codec.decode_line(), Some("OK".to_string()));
        assert!(codec.decode_line().is_none());
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_partial_line() {
        let mut codec = LineCodec::new();
        codec.push(b"\r\n+CPIN: RE");
        assert!(codec.decode_line().is_none());
        assert_eq!(codec.buffered(), b"+CPIN: RE");

        codec.push(b"ADY\r");
        assert_eq!(codec.decode_line(), Some("+CPIN: READY".to_string()));
        codec.push(b"\n");
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_bare_newlines() {
        let mut codec = LineCodec::new();
        codec.push(b"first\nsecond\n");
        assert_eq!(codec.decode_line(), Some("first".to_string()));
        assert_eq!(codec.decode_line(), Some("second".to_string()));
    }

    #[test]
    fn test_oversized_line_is_discarded() {
        let mut codec = LineCodec::new();
        codec.push(b"+CPIN: READY\r\n");
        codec.push(&vec![b'A'; 1 << 20]);
        assert!(codec.buffered_len() <= "+CPIN: READY\r\n".len() + MAX_LINE_LENGTH);

        codec.push(b"AAAA\r\nOK\r\n");
        assert_eq!(codec.decode_line(), Some("+CPIN: READY".to_string()));
        assert_eq!(codec.decode_line(), Some("OK".to_string()));
        assert!(codec.decode_line().is_none());
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_line_at_max_length_is_kept() {
        let mut codec = LineCodec::new();
        let line = vec![b'B'; MAX_LINE_LENGTH];
        codec.push(&line);
        codec.push(b"\r\n");
        assert_eq!(codec.decode_line().map(|l| l.len()), Some(MAX_LINE_LENGTH));
    }

    #[test]
    fn test_clear() {
        let mut codec = LineCodec::new();
        codec.push(b"+COPS: ");
        codec.clear();
        assert!(codec.buffered().is_empty());
    }
}
