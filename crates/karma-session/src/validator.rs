//! Incoming-message validation with a disconnect threshold.

use karma_protocol::{Message, ServerMessageType};

/// Sanity-checks server traffic and counts strikes toward a threshold.
///
/// Two things count as invalid: a type code outside the server-origin
/// enumeration, and a frame the transport could not decode at all. When
/// the count reaches the threshold the controller declares the stream
/// desynchronized and tears the connection down — a peer that keeps
/// emitting garbage will not get better by being listened to longer.
///
/// The count resets on every successful handshake acknowledgement.
#[derive(Debug)]
pub struct MessageValidator {
    invalid_count: u32,
    threshold: u32,
}

impl MessageValidator {
    /// Creates a validator that tolerates `threshold - 1` strikes.
    pub fn new(threshold: u32) -> Self {
        Self {
            invalid_count: 0,
            threshold,
        }
    }

    /// Classifies a message by server-origin type.
    ///
    /// `None` means the type code is not one the server may send; the
    /// strike is recorded here so callers can't forget to.
    pub fn classify(&mut self, msg: &Message) -> Option<ServerMessageType> {
        match msg.server_type() {
            Some(ty) => Some(ty),
            None => {
                self.invalid_count += 1;
                tracing::warn!(
                    msg_type = msg.msg_type,
                    strikes = self.invalid_count,
                    "unknown server message type"
                );
                None
            }
        }
    }

    /// Records an undecodable frame reported by the transport.
    pub fn note_invalid_frame(&mut self) {
        self.invalid_count += 1;
        tracing::warn!(strikes = self.invalid_count, "undecodable frame");
    }

    /// `true` once the strike count has reached the threshold.
    pub fn threshold_reached(&self) -> bool {
        self.invalid_count >= self.threshold
    }

    /// Current strike count.
    pub fn invalid_count(&self) -> u32 {
        self.invalid_count
    }

    /// Clears the strike count (after a successful handshake).
    pub fn reset(&mut self) {
        self.invalid_count = 0;
    }
}
