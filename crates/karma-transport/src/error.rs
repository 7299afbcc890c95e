//! Error types for the transport layer.

/// Errors that can occur on the transport layer.
///
/// Connection failures are classified distinctly because the session
/// layer reports them differently to the user: a refused connection
/// ("is the server running?") is actionable in a way a generic I/O
/// error is not. No variant triggers an implicit retry here.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer actively refused the connection.
    #[error("connection refused by {0}")]
    Refused(String),

    /// The connect attempt did not complete within the timeout.
    #[error("connection to {0} timed out")]
    TimedOut(String),

    /// The connection is closed; sends are rejected.
    #[error("connection closed")]
    Closed,

    /// Any other socket-level failure.
    #[error("transport i/o error: {0}")]
    Io(#[source] std::io::Error),
}
