//! Core types and rules for the tic-tac-toe room server
//!
//! This crate holds the pure game domain: marks, cells, the 3x3 board,
//! player roles, per-room state, and win/draw evaluation. It performs no
//! I/O and knows nothing about transports or storage, so the server crate
//! and its tests can share one authoritative model.

use serde::{Deserialize, Serialize};

pub mod rules;

pub use rules::{evaluate, Outcome, WIN_LINES};

// ============================================================================
// Marks and Cells
// ============================================================================

/// One of the two playing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The side that moves after this one.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mark {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" => Ok(Mark::X),
            "O" => Ok(Mark::O),
            other => Err(format!("invalid mark: {other:?}")),
        }
    }
}

/// A single board cell.
///
/// The empty cell serializes as `""` so the wire format matches the
/// original browser client, which renders cell strings directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    #[serde(rename = "")]
    Empty,
    X,
    O,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// The mark occupying this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

// ============================================================================
// Board
// ============================================================================

/// A 3x3 board flattened row-major, indices 0-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board([Cell; 9]);

impl Board {
    /// Number of cells on the board.
    pub const SIZE: usize = 9;

    /// An all-empty board.
    pub fn new() -> Self {
        Self([Cell::Empty; 9])
    }

    /// The cell at `index`, or `None` when the index is out of range.
    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.0.get(index).copied()
    }

    /// Places `mark` at `index`. Callers validate the index and the
    /// cell's emptiness first; out-of-range indices are ignored.
    pub fn place(&mut self, index: usize, mark: Mark) {
        if let Some(cell) = self.0.get_mut(index) {
            *cell = mark.into();
        }
    }

    pub fn is_full(&self) -> bool {
        self.0.iter().all(|cell| !cell.is_empty())
    }

    pub fn cells(&self) -> &[Cell; 9] {
        &self.0
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Roles and Players
// ============================================================================

/// What a joined client is allowed to do in a room.
///
/// The first two distinct identities to join get `X` and `O`; everyone
/// after that is a read-only viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    X,
    O,
    #[serde(rename = "viewer")]
    Viewer,
}

impl From<Mark> for Role {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Role::X,
            Mark::O => Role::O,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::X => write!(f, "X"),
            Role::O => write!(f, "O"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

/// A registered player slot within a room.
///
/// `player_identity` is the stable client-supplied token, not the
/// transient connection id, so a reconnecting client resumes the same
/// role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSlot {
    pub player_identity: String,
    pub role: Mark,
}

// ============================================================================
// Room State
// ============================================================================

/// The complete persisted state of one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomState {
    pub board: Board,
    pub current_player: Mark,
    pub score_x: u32,
    pub score_o: u32,
    pub players: Vec<PlayerSlot>,
    pub is_finished: bool,
}

impl RoomState {
    /// At most two active players per room; later joiners are viewers.
    pub const MAX_PLAYERS: usize = 2;

    /// A fresh room: empty board, X to move, zero scores, no players.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Mark::X,
            score_x: 0,
            score_o: 0,
            players: Vec::new(),
            is_finished: false,
        }
    }

    /// The role previously assigned to `identity`, if it holds a slot.
    pub fn role_of(&self, identity: &str) -> Option<Mark> {
        self.players
            .iter()
            .find(|slot| slot.player_identity == identity)
            .map(|slot| slot.role)
    }

    /// The next unassigned playing role, in join order: X, then O.
    pub fn next_free_role(&self) -> Option<Mark> {
        match self.players.len() {
            0 => Some(Mark::X),
            1 => Some(Mark::O),
            _ => None,
        }
    }

    pub fn score_of(&self, mark: Mark) -> u32 {
        match mark {
            Mark::X => self.score_x,
            Mark::O => self.score_o,
        }
    }
}

impl Default for RoomState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_room_defaults() {
        let room = RoomState::new();
        assert_eq!(room.board, Board::new());
        assert_eq!(room.current_player, Mark::X);
        assert_eq!(room.score_x, 0);
        assert_eq!(room.score_o, 0);
        assert!(room.players.is_empty());
        assert!(!room.is_finished);
    }

    #[test]
    fn empty_cell_serializes_as_empty_string() {
        let mut board = Board::new();
        board.place(4, Mark::X);
        board.place(0, Mark::O);

        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"["O","","","","X","","","",""]"#);

        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn place_ignores_out_of_range_index() {
        let mut board = Board::new();
        board.place(9, Mark::X);
        assert_eq!(board, Board::new());
    }

    #[test]
    fn role_assignment_order() {
        let mut room = RoomState::new();
        assert_eq!(room.next_free_role(), Some(Mark::X));

        room.players.push(PlayerSlot {
            player_identity: "p1".to_string(),
            role: Mark::X,
        });
        assert_eq!(room.next_free_role(), Some(Mark::O));

        room.players.push(PlayerSlot {
            player_identity: "p2".to_string(),
            role: Mark::O,
        });
        assert_eq!(room.next_free_role(), None);

        assert_eq!(room.role_of("p1"), Some(Mark::X));
        assert_eq!(room.role_of("p2"), Some(Mark::O));
        assert_eq!(room.role_of("p3"), None);
    }

    #[test]
    fn player_slot_wire_format() {
        let slot = PlayerSlot {
            player_identity: "p1".to_string(),
            role: Mark::X,
        };
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(json, r#"{"playerIdentity":"p1","role":"X"}"#);
    }
}
