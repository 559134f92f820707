//! Envelope types for the relay's wire format.
//!
//! Every frame is a flat JSON object whose `type` field names the kind and
//! whose remaining fields are camelCase:
//!
//! ```text
//! { "type": "fire", "cellIndex": 7 }
//! { "type": "incoming_shot", "cellIndex": 7, "fromPlayer": 1 }
//! ```
//!
//! Inbound and outbound kinds are separate closed enums, so an unknown
//! `type` fails to decode instead of falling through a string match.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message text sent back to a caller that acts out of turn.
pub const NOT_YOUR_TURN: &str = "Not your turn";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The self-reported identifier a client supplies when joining (in
/// practice a wallet address).
///
/// Never validated and never used for authorization; the relay only hands
/// it to the opponent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A participant's player number as shown to clients: slot index + 1.
///
/// Serialized as a plain number (`1` or `2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerNum(pub u8);

impl PlayerNum {
    /// Converts a zero-based slot index into the external player number.
    pub fn from_slot(slot: usize) -> Self {
        // Slots are 0 or 1; anything else is a bug in the caller.
        debug_assert!(slot < 2, "slot index out of range: {slot}");
        Self(slot as u8 + 1)
    }

    /// Returns the zero-based slot index.
    pub fn slot(self) -> usize {
        usize::from(self.0.saturating_sub(1))
    }
}

impl fmt::Display for PlayerNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ClientMessage: client → relay
// ---------------------------------------------------------------------------

/// An envelope sent by a client.
///
/// Fieldless kinds are written as empty struct variants (`BoardCommitted {}`)
/// so that stray extra fields from a client are ignored rather than
/// rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Take the next free slot. Older clients send the identity as
    /// `address`.
    Join {
        #[serde(alias = "address")]
        identity: Identity,
    },

    /// The client has committed its private board or deck elsewhere and is
    /// ready to play.
    BoardCommitted {},

    /// Turn-gated: shoot at a cell of the opponent's board. The cell is
    /// whatever the client sent; the relay never interprets it.
    Fire { cell_index: Value },

    /// The defender's answer to an incoming shot. Ends the shooter's turn.
    ShotResult {
        cell_index: Value,
        hit: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        proof: Option<Value>,
    },

    /// The sender claims victory.
    GameOver {},

    /// Free-form card game action, relayed untouched.
    TcgAction {
        action: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },

    /// Turn-gated: hand the turn to the opponent.
    PassTurn {},
}

impl ClientMessage {
    /// Returns the kind tag of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Join { .. } => MessageKind::Join,
            Self::BoardCommitted {} => MessageKind::BoardCommitted,
            Self::Fire { .. } => MessageKind::Fire,
            Self::ShotResult { .. } => MessageKind::ShotResult,
            Self::GameOver {} => MessageKind::GameOver,
            Self::TcgAction { .. } => MessageKind::TcgAction,
            Self::PassTurn {} => MessageKind::PassTurn,
        }
    }
}

// ---------------------------------------------------------------------------
// MessageKind: per-kind capabilities
// ---------------------------------------------------------------------------

/// The kind of a [`ClientMessage`], with the preconditions the router
/// checks before dispatching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Join,
    BoardCommitted,
    Fire,
    ShotResult,
    GameOver,
    TcgAction,
    PassTurn,
}

impl MessageKind {
    /// Every kind, in wire order.
    pub const ALL: [MessageKind; 7] = [
        Self::Join,
        Self::BoardCommitted,
        Self::Fire,
        Self::ShotResult,
        Self::GameOver,
        Self::TcgAction,
        Self::PassTurn,
    ];

    /// Returns `true` if the sender must already occupy a slot.
    pub fn requires_participant(self) -> bool {
        !matches!(self, Self::Join)
    }

    /// Returns `true` if a sender without a slot is told "Not your turn"
    /// instead of being ignored.
    pub fn answers_strangers(self) -> bool {
        matches!(self, Self::Fire)
    }

    /// Returns `true` if only the participant holding the turn may send
    /// this kind, and only while a battle is in progress.
    pub fn requires_turn(self) -> bool {
        matches!(self, Self::Fire | Self::PassTurn)
    }

    /// The `type` tag used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::BoardCommitted => "board_committed",
            Self::Fire => "fire",
            Self::ShotResult => "shot_result",
            Self::GameOver => "game_over",
            Self::TcgAction => "tcg_action",
            Self::PassTurn => "pass_turn",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ServerMessage: relay → client
// ---------------------------------------------------------------------------

/// An envelope sent by the relay to one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Reply to `join`: the caller's player number and echoed identity.
    Joined {
        player_num: PlayerNum,
        identity: Identity,
    },

    /// Both slots are filled; carries the other participant's identity.
    /// `opponentAddress` repeats it for clients that read that field.
    OpponentJoined {
        opponent_identity: Identity,
        opponent_address: Identity,
    },

    /// The other participant has committed.
    OpponentReady,

    /// Both participants are ready and the battle begins.
    BattleStart { your_turn: bool },

    /// The opponent fired at one of the recipient's cells.
    IncomingShot {
        cell_index: Value,
        from_player: PlayerNum,
    },

    /// The defender's answer to the recipient's shot.
    ShotResolved {
        cell_index: Value,
        hit: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        proof: Option<Value>,
    },

    /// Whose turn it is now, from the recipient's point of view.
    TurnUpdate { your_turn: bool },

    /// The opponent declared victory.
    YouLost { winner_address: Identity },

    /// A card game action relayed from the opponent.
    TcgAction {
        action: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },

    /// The opponent's connection closed; the session has been reset.
    OpponentDisconnected,

    /// The caller's request was rejected.
    Error { message: String },
}

impl ServerMessage {
    /// Introduces `opponent` to the recipient.
    pub fn opponent_joined(opponent: Identity) -> Self {
        Self::OpponentJoined {
            opponent_address: opponent.clone(),
            opponent_identity: opponent,
        }
    }

    /// The rejection sent to a caller acting out of turn.
    pub fn not_your_turn() -> Self {
        Self::Error {
            message: NOT_YOUR_TURN.to_owned(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
