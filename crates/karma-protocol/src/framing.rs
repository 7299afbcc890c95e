//! Stream framing: reassembles newline-delimited frames from TCP chunks.
//!
//! TCP delivers a byte stream with no message boundaries — one `read` may
//! return half a message, three messages, or a message and a half. The
//! [`MessageFramer`] absorbs that chunking: feed it whatever arrived and
//! it hands back exactly the complete frames, keeping any partial tail
//! buffered for the next chunk.

use crate::ProtocolError;

/// Default hard cap on the accumulation buffer: 1 MiB.
///
/// A legitimate frame is a few hundred bytes. A megabyte of data with no
/// delimiter means the stream is desynchronized, so growing further would
/// only delay the inevitable while eating memory.
pub const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Accumulates received data and extracts complete newline-delimited frames.
///
/// One framer per connection. On disconnect the owner calls
/// [`clear`](Self::clear) so a half-received frame from a dead connection
/// never leaks into a new one.
#[derive(Debug)]
pub struct MessageFramer {
    buffer: String,
    max_size: usize,
}

impl Default for MessageFramer {
    fn default() -> Self {
        Self::new(MAX_BUFFER_SIZE)
    }
}

impl MessageFramer {
    /// Creates a framer with the given buffer cap.
    pub fn new(max_size: usize) -> Self {
        Self {
            buffer: String::new(),
            max_size,
        }
    }

    /// Appends a chunk and returns every frame it completed, in order.
    ///
    /// Frames are returned without their delimiter. Zero-length frames
    /// (adjacent delimiters) are discarded, not emitted.
    ///
    /// # Errors
    /// Returns [`ProtocolError::BufferOverflow`] if the accumulated
    /// undelimited data exceeds the cap. This is fatal for the
    /// connection — the buffer contents are not truncated or partially
    /// delivered.
    pub fn add_data(&mut self, chunk: &str) -> Result<Vec<String>, ProtocolError> {
        self.buffer.push_str(chunk);

        if self.buffer.len() > self.max_size {
            return Err(ProtocolError::BufferOverflow {
                size: self.buffer.len(),
                max: self.max_size,
            });
        }

        let mut frames = Vec::new();
        while let Some(idx) = self.buffer.find('\n') {
            let frame = self.buffer[..idx].to_string();
            self.buffer.drain(..=idx);
            if !frame.is_empty() {
                frames.push(frame);
            }
        }
        Ok(frames)
    }

    /// Discards any partial, undelimited tail.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Returns `true` if an undelimited tail is buffered.
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
