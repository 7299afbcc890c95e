//! Wire protocol for the Karma client.
//!
//! This crate defines the "language" the client and server speak:
//!
//! - **Types** ([`Message`], [`ClientMessageType`], [`ServerMessageType`]) —
//!   the structured form of everything that travels on the wire.
//! - **Framing** ([`MessageFramer`]) — reassembles newline-delimited frames
//!   out of arbitrary TCP chunking.
//! - **Codec** ([`encode`], [`decode`]) — converts between a frame and a
//!   [`Message`], expanding the compact field/value aliases.
//! - **Errors** ([`ProtocolError`]) — what can go wrong, and which failures
//!   are fatal versus recoverable.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (connection state). It doesn't know about sockets or timers — it only
//! knows how to split, parse, and build messages.
//!
//! ```text
//! Transport (bytes) → Framer (frames) → Codec (Message) → Session
//! ```

mod alias;
mod codec;
mod error;
mod framing;
mod types;

pub use alias::{canonical, compact};
pub use codec::{decode, encode};
pub use error::ProtocolError;
pub use framing::MessageFramer;
pub use types::{ClientMessageType, Message, ServerMessageType};
