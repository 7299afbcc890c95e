//! Session layer for the Karma client.
//!
//! This crate owns everything between the raw transport and the UI:
//!
//! 1. **Connection state machine** ([`ConnectionState`]) — which phase of
//!    a session we're in, and which transitions are legal.
//! 2. **Heartbeat** ([`HeartbeatMonitor`]) — periodic ping/pong liveness
//!    detection, so a dead connection is noticed before the socket is.
//! 3. **Validation** ([`MessageValidator`]) — server traffic sanity
//!    checking with a disconnect threshold.
//! 4. **The controller** ([`SessionHandle`] / [`spawn_session`]) — the
//!    actor that composes a transport worker and a heartbeat monitor,
//!    drives the state machine, and runs the bounded reconnection policy.
//!
//! # How it fits in the stack
//!
//! ```text
//! Presentation layer (above)  ← consumes SessionEvents, issues commands
//!     ↕
//! Session layer (this crate)  ← state machine, heartbeat, reconnection
//!     ↕
//! Transport layer (below)  ← one socket, one receive loop
//! ```
//!
//! The presentation layer never reaches past the controller: the worker
//! and the monitor are implementation details replaced wholesale during
//! a reconnection sequence.

mod controller;
mod error;
mod heartbeat;
mod session;
mod state;
mod validator;

pub use controller::{spawn_session, SessionEvent, SessionHandle};
pub use error::SessionError;
pub use heartbeat::{HeartbeatConfig, HeartbeatEvent, HeartbeatMonitor};
pub use session::{Session, SessionConfig};
pub use state::ConnectionState;
pub use validator::MessageValidator;
