//! TCP transport
//!
//! Commands and responses travel as single JSON lines over plain TCP.
//! The server answers one command per connection.

pub mod client;
pub mod server;

pub use client::RemoteClient;
pub use server::ControlServer;

use std::io::{self, BufRead};

/// Read one `\n`-terminated line of at most `max_len` bytes into `out`
///
/// Returns the number of bytes read; zero means the peer closed the
/// connection without sending anything. Input that reaches EOF without a
/// newline is returned as is. Longer lines fail with `InvalidData`.
pub(crate) fn read_line_bounded<R: BufRead>(
    reader: &mut R,
    out: &mut Vec<u8>,
    max_len: usize,
) -> io::Result<usize> {
    out.clear();

    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(out.len());
        }

        let (take_len, found_newline) = match available.iter().position(|b| *b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };

        let remaining = max_len.saturating_sub(out.len());
        if take_len > remaining {
            let consume_len = remaining.min(available.len());
            reader.consume(consume_len);
            return Err(io::Error::new(io::ErrorKind::InvalidData, "message too large"));
        }

        out.extend_from_slice(&available[..take_len]);
        reader.consume(take_len);

        if found_newline {
            return Ok(out.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    #[test]
    fn test_reads_single_line() {
        let mut reader = Cursor::new(b"{\"action\":\"get_status\"}\nrest".to_vec());
        let mut out = Vec::new();

        let n = read_line_bounded(&mut reader, &mut out, 64).unwrap();
        assert_eq!(n, 24);
        assert_eq!(out, b"{\"action\":\"get_status\"}\n");
    }

    #[test]
    fn test_unterminated_input_at_eof() {
        let mut reader = Cursor::new(b"{}".to_vec());
        let mut out = Vec::new();
        assert_eq!(read_line_bounded(&mut reader, &mut out, 64).unwrap(), 2);
    }

    #[test]
    fn test_empty_input() {
        let mut reader = Cursor::new(Vec::new());
        let mut out = Vec::new();
        assert_eq!(read_line_bounded(&mut reader, &mut out, 64).unwrap(), 0);
    }

    #[test]
    fn test_limit_spans_buffer_refills() {
        // Small internal buffer forces several fill_buf rounds
        let mut reader = BufReader::with_capacity(4, Cursor::new(vec![b'x'; 32]));
        let mut out = Vec::new();

        let err = read_line_bounded(&mut reader, &mut out, 16).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(out.len() <= 16);
    }

    #[test]
    fn test_newline_counts_towards_limit() {
        let mut reader = Cursor::new(b"abcd\n".to_vec());
        let mut out = Vec::new();
        assert!(read_line_bounded(&mut reader, &mut out, 4).is_err());

        let mut reader = Cursor::new(b"abcd\n".to_vec());
        assert_eq!(read_line_bounded(&mut reader, &mut out, 5).unwrap(), 5);
    }
}
