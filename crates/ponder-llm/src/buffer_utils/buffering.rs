use anyhow::Result;
use std::collections::VecDeque;

/// Byte buffer that yields complete newline-terminated lines.
///
/// Network chunks split JSON lines at arbitrary byte offsets (including in the
/// middle of a UTF-8 sequence), so bytes are held until a `\n` arrives.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
}

impl CircularLineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract next line (up to \n), trimmed.
    /// Returns None if no complete line is available
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        Some(decode_line(&line_bytes))
    }

    /// Drain whatever is left once the byte stream has ended.
    /// Returns None when only whitespace remains.
    pub fn take_remaining(&mut self) -> Option<Result<String>> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest: Vec<u8> = self.buffer.drain(..).collect();
        match decode_line(&rest) {
            Ok(line) if line.is_empty() => None,
            other => Some(other),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn decode_line(bytes: &[u8]) -> Result<String> {
    match std::str::from_utf8(bytes) {
        Ok(line) => Ok(line.trim().to_string()),
        Err(e) => Err(anyhow::anyhow!("Invalid UTF-8: {}", e)),
    }
}
