use bytes::{Buf, BytesMut};

/// Reassembles newline-terminated lines out of arbitrarily split byte chunks.
///
/// Splitting happens on the raw `\n` byte before any UTF-8 decoding, so a
/// multi-byte character cut across two chunks is rejoined before it is decoded.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: BytesMut,
    // bytes of `buffer` already searched for a newline
    scanned: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            scanned: 0,
        }
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Pops the next complete line, without its terminator.
    ///
    /// Returns `None` once only an unterminated tail (or nothing) is left.
    pub fn next_line(&mut self) -> Option<String> {
        let unscanned = &self.buffer[self.scanned..];
        let Some(offset) = unscanned.iter().position(|&b| b == b'\n') else {
            self.scanned = self.buffer.len();
            return None;
        };
        let line_bytes = self.buffer.split_to(self.scanned + offset);
        self.buffer.advance(1); // skip newline
        self.scanned = 0;
        Some(decode_line(&line_bytes))
    }

    /// Drops every complete line still buffered, keeping only the unterminated tail.
    pub fn discard_complete_lines(&mut self) -> usize {
        let Some(last) = self.buffer.iter().rposition(|&b| b == b'\n') else {
            return 0;
        };
        let dropped = self.buffer[..last].split(|&b| b == b'\n').count();
        self.buffer.advance(last + 1);
        self.scanned = self.buffer.len();
        dropped
    }

    /// Drains the unterminated tail, treating end of input as its terminator.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = self.buffer.split();
        self.scanned = 0;
        Some(decode_line(&rest))
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn decode_line(line_bytes: &[u8]) -> String {
    // Handle \r if present (CRLF)
    let line_slice = line_bytes.strip_suffix(b"\r").unwrap_or(line_bytes);
    String::from_utf8_lossy(line_slice).into_owned()
}
