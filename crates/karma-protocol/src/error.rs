//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. This keeps
//! errors specific and meaningful — a `ProtocolError` always means the
//! problem is in framing or parsing, not in networking or session state.

/// Errors that can occur while framing or parsing wire data.
///
/// The variants fall into two classes with very different consequences:
///
/// - [`BufferOverflow`](Self::BufferOverflow) is a **framing** error. The
///   accumulation buffer filling up without a delimiter means the stream
///   is desynchronized (or the peer is hostile). There is no way to
///   resynchronize a delimiter-based stream once this happens, so the
///   connection must be torn down.
/// - [`BadFormat`](Self::BadFormat) and [`BadType`](Self::BadType) are
///   **format** errors: one frame was malformed. The stream itself is
///   still aligned on delimiters, so the frame is dropped, the error is
///   reported upward, and the connection keeps running.
///
/// Use [`is_fatal`](Self::is_fatal) to distinguish the classes.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The framing buffer exceeded its hard size limit without a
    /// delimiter arriving. Fatal — tears down the connection.
    #[error("framing buffer overflow: {size} bytes exceeds max {max}")]
    BufferOverflow {
        /// Buffer size after the offending chunk was appended.
        size: usize,
        /// The configured hard limit.
        max: usize,
    },

    /// A frame did not match the wire grammar (fewer than three
    /// pipe-separated segments).
    #[error("invalid message format: {0}")]
    BadFormat(String),

    /// The type segment of a frame was not a valid integer.
    #[error("invalid message type: {0}")]
    BadType(String),
}

impl ProtocolError {
    /// Returns `true` if this error means the stream is unrecoverable
    /// and the connection must be closed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BufferOverflow { .. })
    }
}
