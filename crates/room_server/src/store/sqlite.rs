//! SQLite-backed room store.
//!
//! One row per room in a single `rooms` table. Board and player columns
//! are JSON-encoded; each trait method is a single statement, so every
//! write is atomic on its own. The connection sits behind an async mutex
//! because rusqlite connections are not `Sync`.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tictactoe_core::{Board, Mark, PlayerSlot, RoomState};
use tokio::sync::Mutex;
use tracing::debug;

use super::{RoomStore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS rooms (
    id             TEXT PRIMARY KEY,
    board          TEXT NOT NULL,
    current_player TEXT NOT NULL,
    score_x        INTEGER NOT NULL,
    score_o        INTEGER NOT NULL,
    players        TEXT NOT NULL,
    is_finished    INTEGER NOT NULL
)";

/// Durable room store on a single SQLite database file.
pub struct SqliteRoomStore {
    conn: Mutex<Connection>,
}

impl SqliteRoomStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// An in-memory database for tests. Contents vanish on drop.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn query_room(conn: &Connection, room_id: &str) -> Result<Option<RoomState>, StoreError> {
    let row = conn
        .query_row(
            "SELECT board, current_player, score_x, score_o, players, is_finished
             FROM rooms WHERE id = ?1",
            [room_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, bool>(5)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((board, current_player, score_x, score_o, players, is_finished)) => {
            Ok(Some(RoomState {
                board: serde_json::from_str(&board)?,
                current_player: Mark::from_str(&current_player).map_err(StoreError::Corrupt)?,
                score_x,
                score_o,
                players: serde_json::from_str(&players)?,
                is_finished,
            }))
        }
        None => Ok(None),
    }
}

#[async_trait]
impl RoomStore for SqliteRoomStore {
    async fn get(&self, room_id: &str) -> Result<Option<RoomState>, StoreError> {
        let conn = self.conn.lock().await;
        query_room(&conn, room_id)
    }

    async fn create(&self, room_id: &str) -> Result<RoomState, StoreError> {
        let fresh = RoomState::new();
        let conn = self.conn.lock().await;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO rooms
             (id, board, current_player, score_x, score_o, players, is_finished)
             VALUES (?1, ?2, ?3, 0, 0, ?4, 0)",
            params![
                room_id,
                serde_json::to_string(&fresh.board)?,
                fresh.current_player.as_str(),
                serde_json::to_string(&fresh.players)?,
            ],
        )?;
        if inserted > 0 {
            debug!("created room {room_id}");
        }

        query_room(&conn, room_id)?
            .ok_or_else(|| StoreError::Corrupt(format!("room {room_id} missing after insert")))
    }

    async fn update_players(
        &self,
        room_id: &str,
        players: &[PlayerSlot],
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE rooms SET players = ?1 WHERE id = ?2",
            params![serde_json::to_string(players)?, room_id],
        )?;
        Ok(())
    }

    async fn apply_move(
        &self,
        room_id: &str,
        board: &Board,
        next_player: Mark,
        is_finished: bool,
        score_x: u32,
        score_o: u32,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE rooms
             SET board = ?1, current_player = ?2, is_finished = ?3,
                 score_x = ?4, score_o = ?5
             WHERE id = ?6",
            params![
                serde_json::to_string(board)?,
                next_player.as_str(),
                is_finished,
                score_x,
                score_o,
                room_id
            ],
        )?;
        Ok(())
    }

    async fn reset(&self, room_id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE rooms SET board = ?1, current_player = ?2, is_finished = 0 WHERE id = ?3",
            params![
                serde_json::to_string(&Board::new())?,
                Mark::X.as_str(),
                room_id
            ],
        )?;
        Ok(())
    }
}
