//! Room session management.
//!
//! Resolves join requests into role assignments, tracks which
//! connections belong to which room for broadcast fan-out, and hands out
//! the per-room locks that serialize every read-modify-write sequence
//! touching one room.
//!
//! Role assignment follows join order: the first distinct player
//! identity gets X, the second gets O, everyone after that is a viewer.
//! Rejoining with a known identity returns the previously assigned role
//! without allocating a slot, so a reconnecting client resumes its side.
//! Disconnects remove broadcast membership only - the identity keeps its
//! slot in the store, which means a permanently departed player still
//! occupies X or O. That matches the original deployment's behavior and
//! is kept deliberately.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tictactoe_core::{PlayerSlot, Role, RoomState};
use tokio::sync::Mutex;
use tracing::debug;

use crate::connection::ConnectionId;
use crate::store::{RoomStore, StoreError};

/// What the session manager knows about one live connection.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub room_id: String,
    pub player_identity: String,
}

/// Maps connections to rooms and identities, and rooms to their
/// broadcast audience.
pub struct RoomSessionManager {
    store: Arc<dyn RoomStore>,

    /// Room id -> connections registered for broadcast.
    members: DashMap<String, HashSet<ConnectionId>>,

    /// Connection -> the room and identity it joined with.
    sessions: DashMap<ConnectionId, SessionInfo>,

    /// Per-room operation locks. Guards read-modify-write sequences so
    /// concurrent moves or a move racing a reset serialize per room.
    room_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RoomSessionManager {
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self {
            store,
            members: DashMap::new(),
            sessions: DashMap::new(),
            room_locks: DashMap::new(),
        }
    }

    /// The lock serializing operations on `room_id`. Handlers hold it
    /// across the whole get-validate-write sequence.
    pub fn room_lock(&self, room_id: &str) -> Arc<Mutex<()>> {
        self.room_locks
            .entry(room_id.to_string())
            .or_default()
            .clone()
    }

    /// Resolves a join: creates the room lazily, assigns or restores the
    /// role for `player_identity`, and registers the connection for
    /// room broadcasts.
    ///
    /// Returns the assigned role and the room state after the join.
    /// Callers must hold the room lock.
    pub async fn join(
        &self,
        room_id: &str,
        player_identity: &str,
        connection_id: ConnectionId,
    ) -> Result<(Role, RoomState), StoreError> {
        let mut room = self.store.create(room_id).await?;

        let role = if let Some(mark) = room.role_of(player_identity) {
            // Idempotent rejoin: same identity, same role, no new slot.
            Role::from(mark)
        } else if let Some(mark) = room.next_free_role() {
            room.players.push(PlayerSlot {
                player_identity: player_identity.to_string(),
                role: mark,
            });
            self.store.update_players(room_id, &room.players).await?;
            Role::from(mark)
        } else {
            Role::Viewer
        };

        self.register(room_id, player_identity, connection_id);
        debug!("{player_identity} joined {room_id} as {role} (connection {connection_id})");

        Ok((role, room))
    }

    fn register(&self, room_id: &str, player_identity: &str, connection_id: ConnectionId) {
        let previous = self.sessions.insert(
            connection_id,
            SessionInfo {
                room_id: room_id.to_string(),
                player_identity: player_identity.to_string(),
            },
        );

        // A connection re-joining a different room leaves its old one.
        if let Some(prev) = previous {
            if prev.room_id != room_id {
                if let Some(mut members) = self.members.get_mut(&prev.room_id) {
                    members.remove(&connection_id);
                }
            }
        }

        self.members
            .entry(room_id.to_string())
            .or_default()
            .insert(connection_id);
    }

    /// The room and identity this connection joined with, if any.
    pub fn session(&self, connection_id: ConnectionId) -> Option<SessionInfo> {
        self.sessions
            .get(&connection_id)
            .map(|info| info.clone())
    }

    /// Connections currently registered to `room_id`.
    pub fn members_of(&self, room_id: &str) -> Vec<ConnectionId> {
        self.members
            .get(room_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Removes a closed connection from its room's broadcast set.
    ///
    /// Identity-role bindings in the store are untouched: reconnection
    /// with the same identity resumes the same role.
    pub fn remove_connection(&self, connection_id: ConnectionId) -> Option<SessionInfo> {
        let info = self.sessions.remove(&connection_id).map(|(_, info)| info)?;
        if let Some(mut members) = self.members.get_mut(&info.room_id) {
            members.remove(&connection_id);
        }
        Some(info)
    }
}
