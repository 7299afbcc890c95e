//! Session configuration and the per-connection session record.

use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Tunables for the session layer. Sensible defaults match the server's
/// expectations; tests shrink them to keep wall-clock time down.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a single TCP connect attempt may take.
    pub connect_timeout: Duration,

    /// Interval between heartbeat pings.
    ///
    /// The server drops clients silent for three intervals, so this also
    /// bounds how fast a dead server is noticed.
    pub ping_interval: Duration,

    /// How long after a ping to wait for the pong.
    pub pong_timeout: Duration,

    /// Interval between automatic reconnection attempts.
    pub retry_interval: Duration,

    /// How long after an unexpected loss automatic retries continue.
    /// Once elapsed time exceeds this, only a manual reconnect can
    /// resume the session.
    pub auto_retry_budget: Duration,

    /// The server's total seat-reservation window after a disconnect.
    /// Longer than the auto-retry budget; referenced in user-facing
    /// messaging, not enforced client-side.
    pub session_window: Duration,

    /// Invalid server messages tolerated before the connection is
    /// declared desynchronized and torn down.
    pub invalid_msg_threshold: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            ping_interval: Duration::from_secs(2),
            pong_timeout: Duration::from_secs(2),
            retry_interval: Duration::from_secs(2),
            auto_retry_budget: Duration::from_secs(60),
            session_window: Duration::from_secs(120),
            invalid_msg_threshold: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The in-memory record of one logical connection.
///
/// Exclusively owned by the controller actor. One `Session` may span
/// several transport workers across a reconnection sequence — it is the
/// identity that persists while sockets come and go. It is created by
/// `connect()` and torn down only by an intentional disconnect or a
/// definitive failure; because it lives in process memory, a manual
/// reconnect is impossible across a restart by construction.
#[derive(Debug, Clone)]
pub struct Session {
    /// The identity presented in CONNECT and replayed in RECONNECT.
    pub player_name: String,
    /// Last-known server host.
    pub host: String,
    /// Last-known server port.
    pub port: u16,
    /// When the current unexpected loss was first observed. `None` while
    /// the connection is healthy. A second loss observed while already
    /// reconnecting must not overwrite this.
    pub disconnect_time: Option<Instant>,
    /// Retry attempts made since the loss.
    pub reconnect_attempts: u32,
}

impl Session {
    /// A fresh session for a new logical connection.
    pub fn new(player_name: String, host: String, port: u16) -> Self {
        Self {
            player_name,
            host,
            port,
            disconnect_time: None,
            reconnect_attempts: 0,
        }
    }

    /// Clears reconnection bookkeeping after a confirmed (re)connect.
    pub fn mark_recovered(&mut self) {
        self.disconnect_time = None;
        self.reconnect_attempts = 0;
    }
}
