//! Error types for the session layer.

use crate::ConnectionState;
use karma_transport::TransportError;

/// Errors surfaced by the session controller.
///
/// A command issued in the wrong state is a *rejected result*, never a
/// panic — the caller (typically the UI) decides how to present it.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The command is not legal in the current connection state.
    #[error("{command} not allowed in state {state}")]
    InvalidState {
        /// The rejected command, for logging.
        command: &'static str,
        /// The state the controller was in.
        state: ConnectionState,
    },

    /// Manual reconnect requires host/port/name cached from an earlier
    /// `connect()` in this process.
    #[error("no cached session to reconnect")]
    NoCachedSession,

    /// The controller task has shut down; the handle is stale.
    #[error("session controller is gone")]
    ControllerGone,

    /// A transport-level failure, classified by cause.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
