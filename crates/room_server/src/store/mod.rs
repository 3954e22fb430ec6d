//! Durable room storage.
//!
//! One record per room id, holding the full [`RoomState`]. SQLite is the
//! only durable store: every write commits before any snapshot is
//! broadcast, so a crash can never have announced state that was not
//! persisted. [`MemoryRoomStore`] implements the same contract for tests.
//!
//! The store contract is per-call atomic. Read-modify-write sequences
//! that span calls (move validation, role assignment) are serialized by
//! the per-room lock owned by the session manager, not by the store.

use async_trait::async_trait;
use thiserror::Error;
use tictactoe_core::{Board, Mark, PlayerSlot, RoomState};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryRoomStore;
pub use sqlite::SqliteRoomStore;

/// Errors from the durable room store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Room column could not be encoded or decoded as JSON.
    #[error("room encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A stored record holds a value no writer produces.
    #[error("corrupt room record: {0}")]
    Corrupt(String),
}

/// Keyed, single-record room storage.
///
/// `create` is idempotent; every mutation keyed on an unknown room id is
/// a no-op rather than an error, so a stale client can never crash a
/// session by naming a room that does not exist.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Fetches a room, or `None` when the id is unknown.
    async fn get(&self, room_id: &str) -> Result<Option<RoomState>, StoreError>;

    /// Creates a fresh room, or returns the existing one unchanged.
    async fn create(&self, room_id: &str) -> Result<RoomState, StoreError>;

    /// Replaces the room's registered player slots.
    async fn update_players(
        &self,
        room_id: &str,
        players: &[PlayerSlot],
    ) -> Result<(), StoreError>;

    /// Persists the result of an applied move in one write.
    async fn apply_move(
        &self,
        room_id: &str,
        board: &Board,
        next_player: Mark,
        is_finished: bool,
        score_x: u32,
        score_o: u32,
    ) -> Result<(), StoreError>;

    /// Clears the board and turn for a new round, preserving scores and
    /// player slots.
    async fn reset(&self, room_id: &str) -> Result<(), StoreError>;
}
