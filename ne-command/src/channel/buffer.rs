//! Pattern buffer with tail-only prompt search.
//!
//! Only the last `search_depth` bytes are searched for prompts, so long
//! outputs such as `display current-configuration` do not make every read
//! rescan the whole buffer.

use bytes::{Bytes, BytesMut};
use regex::bytes::Regex;

use super::ansi::AnsiStripper;

/// Accumulates ANSI-stripped channel output.
#[derive(Debug)]
pub struct PatternBuffer {
    buffer: BytesMut,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,

    stripper: AnsiStripper,
}

impl PatternBuffer {
    /// Create a buffer searching the last `search_depth` bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            search_depth,
            stripper: AnsiStripper::new(),
        }
    }

    /// Append raw channel data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = self.stripper.strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Search the tail for `pattern`.
    ///
    /// Returns the match start as an offset into the whole buffer.
    pub fn search_tail(&self, pattern: &Regex) -> Option<usize> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern.find(&self.buffer[start..]).map(|m| start + m.start())
    }

    /// Check if the tail contains a pattern match.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        self.search_tail(pattern).is_some()
    }

    /// Take the buffered bytes, leaving the buffer empty.
    pub fn take(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    /// Current contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard buffered output.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"\x1b[32mGreen text\x1b[0m");
        assert_eq!(buffer.as_slice(), b"Green text");
    }

    #[test]
    fn test_tail_search_offset_is_absolute() {
        let mut buffer = PatternBuffer::new(20);
        buffer.extend(&[b'x'; 100]);
        buffer.extend(b"\n<HUAWEI>");

        let pattern = Regex::new(r"<HUAWEI>").unwrap();
        assert_eq!(buffer.search_tail(&pattern), Some(101));
    }

    #[test]
    fn test_prompt_outside_tail_not_found() {
        let mut buffer = PatternBuffer::new(10);
        buffer.extend(b"<HUAWEI>");
        buffer.extend(&[b'x'; 100]);

        let pattern = Regex::new(r"<HUAWEI>").unwrap();
        assert!(!buffer.tail_contains(&pattern));
    }

    #[test]
    fn test_take_clears_buffer() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"test data");
        assert_eq!(&buffer.take()[..], b"test data");
        assert!(buffer.is_empty());
    }
}
