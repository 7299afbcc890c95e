//! The connection state machine.

use std::fmt;

/// The phase of a client session. Exactly one is active at a time.
///
/// ```text
/// Disconnected ──connect()──→ Connecting ──ack──→ Connected
///       ↑                         │                 │  ↕ room/game acks
///       │                         │ rejected        ▼
///       │                         ▼            InRoom ⇄ InGame
///       │◁────────────────── Disconnected           │
///       │                                           │ unexpected loss /
///       │         window exceeded                   ▼ heartbeat timeout
///       └◁───────────────────────────────── Reconnecting ──ack──→ Connected
/// ```
///
/// Transitions occur only along the edges encoded in
/// [`can_transition_to`](Self::can_transition_to); the controller rejects
/// everything else. An intentional disconnect is legal from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No connection and no attempt in flight.
    Disconnected,
    /// TCP established (or in flight), handshake not yet acknowledged.
    Connecting,
    /// Handshake acknowledged; in the lobby.
    Connected,
    /// Seated in a room, game not started.
    InRoom,
    /// A game is running.
    InGame,
    /// Unexpected loss; timed retry attempts in progress.
    Reconnecting,
}

impl ConnectionState {
    /// Returns `true` while an acknowledged connection is up.
    pub fn is_online(self) -> bool {
        matches!(self, Self::Connected | Self::InRoom | Self::InGame)
    }

    /// Returns `true` if the transition `self → target` is one of the
    /// defined edges. Self-transitions are not edges; the controller
    /// treats them as no-ops before consulting this table.
    pub fn can_transition_to(self, target: Self) -> bool {
        use ConnectionState::*;
        match (self, target) {
            // connect() and manual reconnect
            (Disconnected, Connecting) | (Disconnected, Reconnecting) => true,
            // handshake outcome
            (Connecting, Connected) | (Connecting, Disconnected) => true,
            // room and game acks (InGame directly from Connected covers
            // authoritative game traffic after a mid-game reconnect)
            (Connected, InRoom) | (Connected, InGame) => true,
            (InRoom, InGame) | (InRoom, Connected) => true,
            (InGame, Connected) => true,
            // unexpected loss from any online state
            (Connected, Reconnecting)
            | (InRoom, Reconnecting)
            | (InGame, Reconnecting) => true,
            // reconnection outcome
            (Reconnecting, Connected) | (Reconnecting, Disconnected) => true,
            // intentional disconnect from anywhere
            (_, Disconnected) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::InRoom => "IN_ROOM",
            Self::InGame => "IN_GAME",
            Self::Reconnecting => "RECONNECTING",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConnectionState::*;

    const ALL: [ConnectionState; 6] =
        [Disconnected, Connecting, Connected, InRoom, InGame, Reconnecting];

    #[test]
    fn test_connect_only_legal_from_disconnected() {
        assert!(Disconnected.can_transition_to(Connecting));
        for state in [Connecting, Connected, InRoom, InGame, Reconnecting] {
            assert!(
                !state.can_transition_to(Connecting),
                "{state} must not re-enter Connecting"
            );
        }
    }

    #[test]
    fn test_handshake_outcomes() {
        assert!(Connecting.can_transition_to(Connected));
        assert!(Connecting.can_transition_to(Disconnected));
        assert!(!Connecting.can_transition_to(InRoom));
        assert!(!Connecting.can_transition_to(InGame));
    }

    #[test]
    fn test_room_and_game_edges() {
        assert!(Connected.can_transition_to(InRoom));
        assert!(InRoom.can_transition_to(InGame));
        assert!(InRoom.can_transition_to(Connected));
        assert!(InGame.can_transition_to(Connected));
        // Mid-game reconnection: authoritative traffic forces InGame
        // straight from Connected.
        assert!(Connected.can_transition_to(InGame));
        // But a game can't materialize out of thin air.
        assert!(!Disconnected.can_transition_to(InGame));
        assert!(!Reconnecting.can_transition_to(InGame));
    }

    #[test]
    fn test_loss_edges_only_from_online_states() {
        assert!(Connected.can_transition_to(Reconnecting));
        assert!(InRoom.can_transition_to(Reconnecting));
        assert!(InGame.can_transition_to(Reconnecting));
        // Manual reconnect re-enters the retry path from Disconnected.
        assert!(Disconnected.can_transition_to(Reconnecting));
        assert!(!Connecting.can_transition_to(Reconnecting));
    }

    #[test]
    fn test_reconnecting_outcomes() {
        assert!(Reconnecting.can_transition_to(Connected));
        assert!(Reconnecting.can_transition_to(Disconnected));
        assert!(!Reconnecting.can_transition_to(InRoom));
    }

    #[test]
    fn test_intentional_disconnect_from_anywhere() {
        for state in ALL {
            if state != Disconnected {
                assert!(
                    state.can_transition_to(Disconnected),
                    "{state} must allow intentional disconnect"
                );
            }
        }
    }

    #[test]
    fn test_is_online() {
        assert!(Connected.is_online());
        assert!(InRoom.is_online());
        assert!(InGame.is_online());
        assert!(!Disconnected.is_online());
        assert!(!Connecting.is_online());
        assert!(!Reconnecting.is_online());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Disconnected.to_string(), "DISCONNECTED");
        assert_eq!(InGame.to_string(), "IN_GAME");
        assert_eq!(Reconnecting.to_string(), "RECONNECTING");
    }
}
