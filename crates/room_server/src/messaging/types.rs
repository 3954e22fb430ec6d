//! Message type definitions for client-server communication.
//!
//! All frames are JSON text with an externally tagged `event` name in
//! kebab-case and a camelCase `data` payload, e.g.:
//!
//! ```json
//! {
//!   "event": "make-move",
//!   "data": { "roomId": "r1", "cellIndex": 4, "claimedRole": "X" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use tictactoe_core::{Board, Mark, Role, RoomState};

/// A message sent from a client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Join (or lazily create) a room. `player_identity` is the stable
    /// client token used for role assignment across reconnects.
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
        player_identity: String,
    },

    /// Claim a cell. Silently ignored unless every precondition holds.
    #[serde(rename_all = "camelCase")]
    MakeMove {
        room_id: String,
        cell_index: usize,
        claimed_role: Mark,
    },

    /// Start a new round: board cleared, X to move, scores kept.
    #[serde(rename_all = "camelCase")]
    ResetGame { room_id: String },
}

/// A message sent from the server to one or more clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// The joiner's assigned role, sent only to the joiner.
    PlayerAssignment { role: Role },

    /// Full state snapshot for a client that just joined.
    InitState(GameSnapshot),

    /// Sent to the rest of the room when someone joins.
    #[serde(rename_all = "camelCase")]
    UserJoined { player_identity: String },

    /// Full state snapshot broadcast after an applied move or a reset.
    UpdateGame(GameSnapshot),
}

/// Scores keyed by side, serialized as `{"X": n, "O": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(rename = "X")]
    pub x: u32,
    #[serde(rename = "O")]
    pub o: u32,
}

/// The full room snapshot every client renders from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board: Board,
    pub current_player: Mark,
    pub scores: Scores,
    pub is_finished: bool,
}

impl From<&RoomState> for GameSnapshot {
    fn from(room: &RoomState) -> Self {
        Self {
            board: room.board,
            current_player: room.current_player,
            scores: Scores {
                x: room.score_x,
                o: room.score_o,
            },
            is_finished: room.is_finished,
        }
    }
}
