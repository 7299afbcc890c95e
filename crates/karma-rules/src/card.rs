//! Card representation and parsing.

use std::fmt;

use crate::RulesError;

/// The wire marker for an empty discard pile. Not a real card — it
/// parses so that "anything may be played" falls out of the normal
/// comparison path, but it never appears in a hand.
pub const EMPTY_PILE_MARKER: &str = "1S";

/// The wire keyword for playing blind from the reserve stack.
pub const RESERVE_KEYWORD: &str = "RESERVE";

const VALID_RANKS: [&str; 13] = [
    "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K", "A",
];

/// A single playing card, parsed from its wire code (`RANK + SUIT`,
/// e.g. `2H`, `10D`, `AS`).
///
/// Values run 2..=14 with the special ranks:
/// - **2** — wild, playable on anything, anything plays on it
/// - **7** — forces the next play to value ≤ 7
/// - **10** — burns the pile
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Card {
    /// The full wire code, uppercased.
    pub code: String,
    /// Rank part of the code (`"2"`..`"A"`).
    pub rank: String,
    /// Suit character (`H`, `D`, `C`, `S`).
    pub suit: char,
    /// Comparison value, 2..=14 (the empty-pile marker is 0).
    pub value: u8,
}

impl Card {
    /// Parses a wire code.
    ///
    /// # Errors
    /// [`RulesError::BadCard`] for anything that isn't a rank from
    /// 2..=A followed by one of `HDCS` (the empty-pile marker being the
    /// one exception).
    pub fn parse(code: &str) -> Result<Self, RulesError> {
        let code = code.trim().to_uppercase();
        if code.len() < 2 || !code.is_ascii() {
            return Err(RulesError::BadCard(code));
        }

        let (rank, suit) = code.split_at(code.len() - 1);
        let suit = suit.chars().next().expect("one suit char");

        if !matches!(suit, 'H' | 'D' | 'C' | 'S') {
            return Err(RulesError::BadCard(code));
        }
        if !VALID_RANKS.contains(&rank) && code != EMPTY_PILE_MARKER {
            return Err(RulesError::BadCard(code));
        }

        let value = match rank {
            "J" => 11,
            "Q" => 12,
            "K" => 13,
            "A" => 14,
            // The empty-pile marker bottoms out below every real card.
            r => r.parse().unwrap_or(0),
        };
        let value = if code == EMPTY_PILE_MARKER { 0 } else { value };

        Ok(Self {
            rank: rank.to_string(),
            suit,
            value,
            code,
        })
    }

    /// Wild card: playable on anything.
    pub fn is_wild(&self) -> bool {
        self.value == 2
    }

    /// Forces the next play to value ≤ 7.
    pub fn is_seven(&self) -> bool {
        self.value == 7
    }

    /// Burns the pile.
    pub fn is_ten(&self) -> bool {
        self.value == 10
    }

    /// The empty-pile marker rather than a real card.
    pub fn is_empty_marker(&self) -> bool {
        self.code == EMPTY_PILE_MARKER
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self.suit {
            'H' => '♥',
            'D' => '♦',
            'C' => '♣',
            _ => '♠',
        };
        write!(f, "{}{symbol}", self.rank)
    }
}

/// Parses a comma-separated card list (as it appears in message
/// fields), sorted ascending by value. Empty input is an empty list.
///
/// # Errors
/// [`RulesError::BadCard`] on the first code that doesn't parse.
pub fn parse_card_list(cards: &str) -> Result<Vec<Card>, RulesError> {
    cards
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(Card::parse)
        .collect::<Result<Vec<_>, _>>()
        .map(|mut cards| {
            cards.sort_by_key(|c| c.value);
            cards
        })
}

/// The inverse of [`parse_card_list`]: codes joined with commas.
pub fn cards_to_string(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|c| c.code.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

// =========================================================================
// Tests
// =========================================================================
