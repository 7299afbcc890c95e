//! Game rules for the Karma card game.
//!
//! This crate is a pure collaborator of the session layer: it consumes
//! plain string key/values (card codes, the low-constraint flag) exactly
//! as they appear in decoded message fields, and never touches sockets,
//! timers, or connection state. Everything here is synchronous data
//! manipulation.
//!
//! The game in one paragraph: play a card of equal or higher value than
//! the top of the discard pile. Twos are wild, a Seven forces the next
//! play to be Seven or lower, a Ten burns the pile. Multiple cards of
//! the same rank can go down together. When you can't play, you pick up
//! the pile.

mod card;
mod error;
mod rules;

pub use card::{cards_to_string, parse_card_list, Card, EMPTY_PILE_MARKER, RESERVE_KEYWORD};
pub use error::RulesError;
pub use rules::{can_play_on, validate_play};
