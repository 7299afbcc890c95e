//! The wire codec: one frame ↔ one [`Message`].
//!
//! Wire grammar, with the newline already stripped by the framer:
//!
//! ```text
//! <type:int>|<sender>|<room>|<field>=<value>|<field>=<value>|...
//! ```
//!
//! The first three pipe-separated segments are always present (sender and
//! room may be empty strings; the pipes are not optional). Field segments
//! split on the **first** `=` only, so values may legitimately contain
//! `=`. Keys and values travel compact (see [`crate::alias`]) and decode
//! always expands them back to canonical form.

use crate::alias::{canonical, compact};
use crate::{Message, ProtocolError};

/// Parses one frame into a [`Message`].
///
/// Recognized compact field names are expanded. A recognized compact code
/// in value position is expanded too — **except** when the raw value
/// consists solely of digits with an optional leading sign. Numeric
/// payloads (`deck_size=2`) must never collide with alias codes that
/// happen to look numeric.
///
/// No validation of the type code against either enumeration happens
/// here; the session layer owns that decision.
///
/// # Errors
/// - [`ProtocolError::BadFormat`] — fewer than three segments.
/// - [`ProtocolError::BadType`] — non-integer type segment.
pub fn decode(frame: &str) -> Result<Message, ProtocolError> {
    let mut parts = frame.split('|');

    let type_part = parts.next().unwrap_or_default();
    let sender = parts.next();
    let room = parts.next();
    let (Some(sender), Some(room)) = (sender, room) else {
        return Err(ProtocolError::BadFormat(frame.to_string()));
    };

    let msg_type: i32 = type_part
        .parse()
        .map_err(|_| ProtocolError::BadType(type_part.to_string()))?;

    let mut fields = Vec::new();
    for segment in parts {
        // Segments without `=` carry no data; skip them silently so a
        // stray trailing pipe doesn't poison the whole frame.
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        let key = canonical(key).to_string();
        let value = if is_numeric(value) {
            value.to_string()
        } else {
            canonical(value).to_string()
        };
        fields.push((key, value));
    }

    Ok(Message::new(msg_type, sender, room, fields))
}

/// Builds the wire form of a message, terminated with a single newline.
///
/// Field names and values with an alias entry are replaced by their
/// compact codes; everything else passes through unchanged. Callers are
/// responsible for keeping `|`, `=`, and the delimiter out of their
/// payloads — the codec does not escape.
pub fn encode(
    msg_type: i32,
    sender: &str,
    room: &str,
    fields: &[(&str, &str)],
) -> String {
    let mut wire = format!("{msg_type}|{sender}|{room}|");
    let mut first = true;
    for (key, value) in fields {
        if !first {
            wire.push('|');
        }
        first = false;
        wire.push_str(compact(key));
        wire.push('=');
        wire.push_str(compact(value));
    }
    wire.push('\n');
    wire
}

/// `true` if the value is all digits with an optional leading `-` or `+`.
fn is_numeric(value: &str) -> bool {
    let digits = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

// =========================================================================
// Tests
// =========================================================================
