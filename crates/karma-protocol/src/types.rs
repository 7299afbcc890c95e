//! Core protocol types: message type enumerations and the [`Message`] struct.
//!
//! Type codes are split by **origin**, not by value range: the client and
//! server each have their own closed enumeration, and the numeric spaces
//! happen not to overlap only by convention (client 0–8, server 100–112).
//! The codec never validates a code against either enum — whether a code is
//! meaningful is a session-layer question, decided at dispatch time.

use std::fmt;

// ---------------------------------------------------------------------------
// Message type enumerations
// ---------------------------------------------------------------------------

/// Messages the client sends to the server.
///
/// The explicit discriminants are the wire codes — they must never be
/// renumbered, only appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ClientMessageType {
    /// Initial handshake carrying the player name.
    Connect = 0,
    /// Ask the server to seat us in a room.
    JoinRoom = 2,
    /// Heartbeat ping.
    Ping = 4,
    /// Request the game start once the room is full.
    StartGame = 5,
    /// Reconnection handshake carrying the original player name.
    Reconnect = 6,
    /// Play one or more cards (or the reserve keyword).
    PlayCards = 7,
    /// Pick up the discard pile instead of playing.
    PickupPile = 8,
}

impl ClientMessageType {
    /// Maps a raw wire code to the enumeration.
    ///
    /// Returns `None` for codes outside the client-origin set.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Connect),
            2 => Some(Self::JoinRoom),
            4 => Some(Self::Ping),
            5 => Some(Self::StartGame),
            6 => Some(Self::Reconnect),
            7 => Some(Self::PlayCards),
            8 => Some(Self::PickupPile),
            _ => None,
        }
    }

    /// The raw wire code.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ClientMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connect => "CONNECT",
            Self::JoinRoom => "JOIN_ROOM",
            Self::Ping => "PING",
            Self::StartGame => "START_GAME",
            Self::Reconnect => "RECONNECT",
            Self::PlayCards => "PLAY_CARDS",
            Self::PickupPile => "PICKUP_PILE",
        };
        write!(f, "{name}")
    }
}

/// Messages the server sends to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ServerMessageType {
    /// Handshake acknowledged (carries a `status` field).
    Connected = 100,
    /// We were seated in a room.
    RoomJoined = 101,
    /// We (or the room) left; back to the lobby.
    RoomLeft = 102,
    /// Something went wrong server-side.
    Error = 103,
    /// Heartbeat reply.
    Pong = 104,
    /// The game has begun.
    GameStarted = 105,
    /// Authoritative snapshot of the game. Only meaningful mid-game.
    GameState = 106,
    /// The opponent dropped (may come back).
    PlayerDisconnected = 107,
    /// The opponent returned.
    PlayerReconnected = 109,
    /// Outcome of the last play. Only meaningful mid-game.
    TurnResult = 111,
    /// The game ended; a `RoomLeft` follows.
    GameOver = 112,
}

impl ServerMessageType {
    /// Maps a raw wire code to the enumeration.
    ///
    /// Returns `None` for codes outside the server-origin set.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            100 => Some(Self::Connected),
            101 => Some(Self::RoomJoined),
            102 => Some(Self::RoomLeft),
            103 => Some(Self::Error),
            104 => Some(Self::Pong),
            105 => Some(Self::GameStarted),
            106 => Some(Self::GameState),
            107 => Some(Self::PlayerDisconnected),
            109 => Some(Self::PlayerReconnected),
            111 => Some(Self::TurnResult),
            112 => Some(Self::GameOver),
            _ => None,
        }
    }

    /// The raw wire code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Returns `true` for message types that are only meaningful during
    /// active play. Receiving one of these proves a game is running,
    /// whether or not we saw it start — the session layer uses this to
    /// recover its state after a mid-game reconnection.
    pub fn implies_in_game(self) -> bool {
        matches!(self, Self::GameState | Self::TurnResult)
    }
}

impl fmt::Display for ServerMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connected => "CONNECTED",
            Self::RoomJoined => "ROOM_JOINED",
            Self::RoomLeft => "ROOM_LEFT",
            Self::Error => "ERROR",
            Self::Pong => "PONG",
            Self::GameStarted => "GAME_STARTED",
            Self::GameState => "GAME_STATE",
            Self::PlayerDisconnected => "PLAYER_DISCONNECTED",
            Self::PlayerReconnected => "PLAYER_RECONNECTED",
            Self::TurnResult => "TURN_RESULT",
            Self::GameOver => "GAME_OVER",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A decoded wire message.
///
/// Created by [`decode`](crate::decode) from one frame and dispatched
/// immediately — messages are never persisted or re-queued.
///
/// Invariant: after decode, field keys and non-numeric field values are in
/// canonical (expanded) form regardless of whether the wire used a compact
/// alias. Consumers above the codec never see short codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Raw type code. Not validated against either enumeration here —
    /// classification by origin is the session layer's job.
    pub msg_type: i32,
    /// Sender identifier. May be empty.
    pub sender: String,
    /// Room identifier. May be empty.
    pub room: String,
    /// Key/value payload in arrival order.
    pub fields: Vec<(String, String)>,
}

impl Message {
    /// Builds a message from parts.
    pub fn new(
        msg_type: i32,
        sender: impl Into<String>,
        room: impl Into<String>,
        fields: Vec<(String, String)>,
    ) -> Self {
        Self {
            msg_type,
            sender: sender.into(),
            room: room.into(),
            fields,
        }
    }

    /// Looks up a field by its canonical name. First match wins.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Interprets the type code as a server-origin message, if it is one.
    pub fn server_type(&self) -> Option<ServerMessageType> {
        ServerMessageType::from_code(self.msg_type)
    }

    /// Interprets the type code as a client-origin message, if it is one.
    pub fn client_type(&self) -> Option<ClientMessageType> {
        ClientMessageType::from_code(self.msg_type)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message(type={}, sender={}, room={}, {} field(s))",
            self.msg_type,
            self.sender,
            self.room,
            self.fields.len()
        )
    }
}

// =========================================================================
// Tests
// =========================================================================
