//! Unified error type for the client core.

use karma_protocol::ProtocolError;
use karma_rules::RulesError;
use karma_session::SessionError;
use karma_transport::TransportError;

/// Top-level error that wraps all layer-specific errors.
///
/// Front ends using the `karma` meta-crate deal with this single type;
/// the `#[from]` attributes let `?` convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum KarmaError {
    /// A transport-level error (connect, send, loss).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (framing, format).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (state violations, reconnect).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A rules-level error (bad cards, illegal plays).
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// Settings could not be read or written.
    #[error("settings error: {0}")]
    Settings(String),

    /// Logging was initialized twice.
    #[error("logging already initialized")]
    LoggingAlreadyInitialized,
}
