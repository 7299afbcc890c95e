//! Play validation.

use crate::card::{Card, RESERVE_KEYWORD};
use crate::RulesError;

/// Whether `card` may go on top of `top`.
///
/// `must_play_low` is the constraint a Seven leaves behind: the next
/// play must be value ≤ 7 (wilds excepted).
pub fn can_play_on(card: &Card, top: &Card, must_play_low: bool) -> bool {
    // Empty pile: anything goes, except that a pending low-constraint
    // survives the pile being burned away underneath it.
    if top.is_empty_marker() {
        return !must_play_low || card.value <= 7 || card.is_wild();
    }

    // Wilds and tens ignore the pile entirely.
    if card.is_wild() || card.is_ten() {
        return true;
    }

    if must_play_low {
        return card.value <= 7;
    }

    // Anything plays on a wild; otherwise equal-or-higher.
    top.is_wild() || card.value >= top.value
}

/// Validates a whole play as it would go on the wire: a comma-separated
/// selection (or the reserve keyword) against the current top card and
/// low-constraint flag — both plain strings straight out of message
/// fields.
///
/// Returns the parsed selection on success so callers don't parse twice.
/// A reserve play returns an empty list: the card is face-down, so there
/// is nothing to validate client-side.
///
/// # Errors
/// - [`RulesError::BadCard`] — selection or top card didn't parse
/// - [`RulesError::EmptySelection`] — nothing selected
/// - [`RulesError::MixedRanks`] — multi-card play across ranks
/// - [`RulesError::NotPlayable`] — legal cards, illegal on this pile
pub fn validate_play(
    selection: &str,
    top_card: &str,
    must_play_low: bool,
) -> Result<Vec<Card>, RulesError> {
    if selection == RESERVE_KEYWORD {
        return Ok(Vec::new());
    }

    let cards = crate::parse_card_list(selection)?;
    let Some(first) = cards.first() else {
        return Err(RulesError::EmptySelection);
    };

    if !cards.iter().all(|c| c.rank == first.rank) {
        return Err(RulesError::MixedRanks);
    }

    let top = Card::parse(top_card)?;
    // Same rank throughout, so checking one card checks them all.
    if !can_play_on(first, &top, must_play_low) {
        return Err(RulesError::NotPlayable {
            card: first.code.clone(),
            top: top.code,
        });
    }

    Ok(cards)
}

// =========================================================================
// Tests
// =========================================================================
