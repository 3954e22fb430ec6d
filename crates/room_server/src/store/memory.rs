//! In-memory room store for tests.
//!
//! Implements the same contract as the SQLite store, including the
//! unknown-room no-op semantics, so handler and session tests can run
//! without touching disk.

use async_trait::async_trait;
use dashmap::DashMap;
use tictactoe_core::{Board, Mark, PlayerSlot, RoomState};

use super::{RoomStore, StoreError};

/// Non-durable store backed by a concurrent map.
#[derive(Default)]
pub struct MemoryRoomStore {
    rooms: DashMap<String, RoomState>,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn get(&self, room_id: &str) -> Result<Option<RoomState>, StoreError> {
        Ok(self.rooms.get(room_id).map(|room| room.clone()))
    }

    async fn create(&self, room_id: &str) -> Result<RoomState, StoreError> {
        let room = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(RoomState::new);
        Ok(room.clone())
    }

    async fn update_players(
        &self,
        room_id: &str,
        players: &[PlayerSlot],
    ) -> Result<(), StoreError> {
        if let Some(mut room) = self.rooms.get_mut(room_id) {
            room.players = players.to_vec();
        }
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
        if let Some(mut room) = self.rooms.get_mut(room_id) {
            room.board = *board;
            room.current_player = next_player;
            room.is_finished = is_finished;
            room.score_x = score_x;
            room.score_o = score_o;
        }
        Ok(())
    }

    async fn reset(&self, room_id: &str) -> Result<(), StoreError> {
        if let Some(mut room) = self.rooms.get_mut(room_id) {
            room.board = Board::new();
            room.current_player = Mark::X;
            room.is_finished = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteRoomStore;
    use std::sync::Arc;

    // Contract tests shared by both store implementations.
    async fn create_is_idempotent(store: Arc<dyn RoomStore>) {
        let fresh = store.create("r1").await.unwrap();
        assert_eq!(fresh, RoomState::new());

        let players = vec![PlayerSlot {
            player_identity: "p1".to_string(),
            role: Mark::X,
        }];
        store.update_players("r1", &players).await.unwrap();

        // Second create must return the existing room, not reset it.
        let again = store.create("r1").await.unwrap();
        assert_eq!(again.players, players);
    }

    async fn unknown_room_mutations_are_noops(store: Arc<dyn RoomStore>) {
        store
            .update_players("missing", &[])
            .await
            .expect("update on unknown room must not fail");
        store
            .apply_move("missing", &Board::new(), Mark::O, false, 0, 0)
            .await
            .expect("move on unknown room must not fail");
        store
            .reset("missing")
            .await
            .expect("reset on unknown room must not fail");

        // None of the no-ops may have created a record.
        assert!(store.get("missing").await.unwrap().is_none());
    }

    async fn move_then_reset_round_trip(store: Arc<dyn RoomStore>) {
        store.create("r1").await.unwrap();

        let mut board = Board::new();
        board.place(4, Mark::X);
        store
            .apply_move("r1", &board, Mark::O, true, 1, 0)
            .await
            .unwrap();

        let room = store.get("r1").await.unwrap().unwrap();
        assert_eq!(room.board, board);
        assert_eq!(room.current_player, Mark::O);
        assert!(room.is_finished);
        assert_eq!(room.score_x, 1);

        store.reset("r1").await.unwrap();
        let room = store.get("r1").await.unwrap().unwrap();
        assert_eq!(room.board, Board::new());
        assert_eq!(room.current_player, Mark::X);
        assert!(!room.is_finished);
        // Scores survive a reset.
        assert_eq!(room.score_x, 1);
        assert_eq!(room.score_o, 0);
    }

    #[tokio::test]
    async fn memory_store_contract() {
        create_is_idempotent(Arc::new(MemoryRoomStore::new())).await;
        unknown_room_mutations_are_noops(Arc::new(MemoryRoomStore::new())).await;
        move_then_reset_round_trip(Arc::new(MemoryRoomStore::new())).await;
    }

    #[tokio::test]
    async fn sqlite_store_contract() {
        create_is_idempotent(Arc::new(SqliteRoomStore::in_memory().unwrap())).await;
        unknown_room_mutations_are_noops(Arc::new(SqliteRoomStore::in_memory().unwrap())).await;
        move_then_reset_round_trip(Arc::new(SqliteRoomStore::in_memory().unwrap())).await;
    }

    #[tokio::test]
    async fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.db");

        {
            let store = SqliteRoomStore::open(&path).unwrap();
            store.create("r1").await.unwrap();
            let mut board = Board::new();
            board.place(0, Mark::X);
            store
                .apply_move("r1", &board, Mark::O, false, 0, 0)
                .await
                .unwrap();
            store
                .update_players(
                    "r1",
                    &[PlayerSlot {
                        player_identity: "p1".to_string(),
                        role: Mark::X,
                    }],
                )
                .await
                .unwrap();
        }

        let store = SqliteRoomStore::open(&path).unwrap();
        let room = store.get("r1").await.unwrap().unwrap();
        assert_eq!(room.board.cell(0), Some(tictactoe_core::Cell::X));
        assert_eq!(room.current_player, Mark::O);
        assert_eq!(room.players.len(), 1);
        assert_eq!(room.role_of("p1"), Some(Mark::X));
    }
}
