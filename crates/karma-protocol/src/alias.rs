//! The compact alias table: verbose field names and values ↔ short wire codes.
//!
//! Game-state messages repeat the same field names dozens of times per
//! second, so the wire uses two-letter codes (`hand` → `h`, `status` →
//! `st`). The table is pure data — a closed, bidirectional mapping — and
//! the codec is the only consumer. Everything above the codec sees only
//! canonical names.
//!
//! The table is closed: adding an entry is a protocol change that must be
//! coordinated with the server.

/// Canonical name → compact code, one row per mapping.
///
/// Field names first, then status/result values. A value-position code
/// only expands when the raw value is non-numeric (see
/// [`decode`](crate::decode)), so codes that look like numbers are banned
/// here by convention.
static ALIASES: &[(&str, &str)] = &[
    // Field names
    ("hand", "h"),
    ("reserves", "r"),
    ("opponent_hand", "oh"),
    ("opponent_reserves", "or"),
    ("opponent_name", "on"),
    ("top_card", "tc"),
    ("discard_pile_size", "dp"),
    ("deck_size", "dk"),
    ("must_play_low", "ml"),
    ("your_turn", "yt"),
    ("current_player", "cp"),
    ("status", "st"),
    ("name", "nm"),
    ("error", "er"),
    ("result", "rs"),
    ("cards", "cd"),
    ("winner", "wn"),
    ("reconnected_player", "rp"),
    ("disconnected_player", "dc"),
    ("broadcast_type", "bt"),
    ("joined_player", "jp"),
    ("players", "pl"),
    ("player_count", "pc"),
    ("room_full", "rf"),
    ("disconnect", "disc"),
    ("message", "msg"),
    ("reason", "rsn"),
    // Status values
    ("temporarily_disconnected", "temp"),
    ("reconnected", "recon"),
    ("success", "ok"),
    ("game_over", "end"),
    ("started", "start"),
    ("left", "lft"),
    ("timed_out", "tout"),
    ("invalid_message", "inv"),
    // Result values
    ("play_success", "pok"),
    ("pickup_success", "uok"),
    ("opponent_disconnect", "opdc"),
    // Broadcast values
    ("room_notification", "rnotif"),
];

/// Maps a canonical name to its compact wire code.
///
/// Unmapped names pass through unchanged, so callers can apply this
/// unconditionally.
pub fn compact(name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(full, _)| *full == name)
        .map_or(name, |(_, code)| code)
}

/// Maps a compact wire code back to its canonical name.
///
/// Unmapped codes pass through unchanged — a frame that already carries
/// verbose names decodes identically to one using codes.
pub fn canonical(code: &str) -> &str {
    ALIASES
        .iter()
        .find(|(_, short)| *short == code)
        .map_or(code, |(full, _)| full)
}
