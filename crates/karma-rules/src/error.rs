//! Error types for the rules layer.

/// Errors produced while parsing cards or validating a play.
///
/// The display strings are written for direct presentation to the
/// player — the session and UI layers pass them through unchanged.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// A card code did not parse (`"2H"`, `"10D"`, `"AS"` are the shape).
    #[error("invalid card code: {0}")]
    BadCard(String),

    /// A play must contain at least one card.
    #[error("no cards selected")]
    EmptySelection,

    /// Multi-card plays must all share one rank.
    #[error("all played cards must have the same rank")]
    MixedRanks,

    /// The selection is legal cards, but not on this pile.
    #[error("{card} cannot be played on {top}")]
    NotPlayable {
        /// The offending card code.
        card: String,
        /// The current top of the pile.
        top: String,
    },
}
