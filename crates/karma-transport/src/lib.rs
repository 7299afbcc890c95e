//! TCP transport layer for the Karma client.
//!
//! One [`TransportWorker`] owns one TCP connection attempt: the socket, a
//! dedicated receive loop, and the single serialized write path. Decoded
//! traffic and lifecycle notifications flow to the owner over an mpsc
//! channel as [`TransportEvent`]s — the owner never touches worker-owned
//! memory directly.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session layer (above)  ← owns the worker, consumes TransportEvents
//!     ↕
//! Transport layer (this crate)  ← one socket, one receive loop
//!     ↕
//! Protocol layer (below)  ← framing and codec
//! ```
//!
//! The worker performs no retries and no reconnection — a worker whose
//! receive loop has exited is dead, and the session layer replaces it
//! with a fresh instance.

mod error;
mod worker;

pub use error::TransportError;
pub use worker::{TransportEvent, TransportSender, TransportWorker, STOP_JOIN_TIMEOUT};
