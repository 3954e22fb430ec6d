//! The move protocol handler.
//!
//! Parses inbound frames and drives the per-room state machine:
//! join-room, make-move, reset-game, plus disconnect cleanup. Every
//! precondition failure on a move is a silent no-op - no state change,
//! no broadcast, nothing emitted to the caller. Changed state is always
//! committed to the store before the snapshot goes out.

use std::sync::Arc;

use tictactoe_core::{evaluate, Board, Mark, Outcome};
use tracing::{debug, info};

use crate::connection::{ClientSender, ConnectionId};
use crate::error::ServerError;
use crate::messaging::{ClientMessage, ServerMessage};
use crate::session::RoomSessionManager;
use crate::store::RoomStore;

/// Handles incoming client messages.
///
/// Holds the room lock for the full read-validate-write sequence of each
/// operation, so two near-simultaneous moves (or a move racing a reset)
/// on one room serialize instead of clobbering each other. Operations on
/// distinct rooms interleave freely.
pub struct MessageHandler {
    sessions: Arc<RoomSessionManager>,
    store: Arc<dyn RoomStore>,
    sender: Arc<dyn ClientSender>,
}

impl MessageHandler {
    pub fn new(
        sessions: Arc<RoomSessionManager>,
        store: Arc<dyn RoomStore>,
        sender: Arc<dyn ClientSender>,
    ) -> Self {
        Self {
            sessions,
            store,
            sender,
        }
    }

    /// Process one raw text frame from a client.
    ///
    /// Malformed frames are logged and dropped; client input can never
    /// crash the handling task. Only storage failures return an error.
    pub async fn handle_message(
        &self,
        text: &str,
        connection_id: ConnectionId,
    ) -> Result<(), ServerError> {
        let message: ClientMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                debug!("Ignoring malformed frame from {connection_id}: {e}");
                return Ok(());
            }
        };

        match message {
            ClientMessage::JoinRoom {
                room_id,
                player_identity,
            } => {
                self.handle_join(&room_id, &player_identity, connection_id)
                    .await
            }
            ClientMessage::MakeMove {
                room_id,
                cell_index,
                claimed_role,
            } => {
                self.handle_move(&room_id, cell_index, claimed_role, connection_id)
                    .await
            }
            ClientMessage::ResetGame { room_id } => self.handle_reset(&room_id).await,
        }
    }

    /// Join a room: assign or restore a role, send the joiner its
    /// assignment and a full snapshot, tell the rest of the room.
    async fn handle_join(
        &self,
        room_id: &str,
        player_identity: &str,
        connection_id: ConnectionId,
    ) -> Result<(), ServerError> {
        let lock = self.sessions.room_lock(room_id);
        let _guard = lock.lock().await;

        let (role, room) = self
            .sessions
            .join(room_id, player_identity, connection_id)
            .await?;

        self.send(connection_id, &ServerMessage::PlayerAssignment { role })
            .await?;
        self.send(connection_id, &ServerMessage::InitState((&room).into()))
            .await?;
        self.broadcast_except(
            room_id,
            connection_id,
            &ServerMessage::UserJoined {
                player_identity: player_identity.to_string(),
            },
        )
        .await?;

        info!("Player {player_identity} joined room {room_id} as {role}");
        Ok(())
    }

    /// Validate and apply a move.
    ///
    /// Preconditions, checked in order, each a silent no-op when
    /// violated: the connection joined this room; the room exists; the
    /// round is in progress; the index is on the board and the cell
    /// empty; the claimed role has the turn; and the acting identity
    /// actually holds the claimed role (viewers and spoofed roles are
    /// ignored even for otherwise-valid cells).
    async fn handle_move(
        &self,
        room_id: &str,
        cell_index: usize,
        claimed_role: Mark,
        connection_id: ConnectionId,
    ) -> Result<(), ServerError> {
        let Some(session) = self.sessions.session(connection_id) else {
            debug!("Move from {connection_id} before any join; ignoring");
            return Ok(());
        };
        if session.room_id != room_id {
            debug!("Move from {connection_id} for room {room_id} it has not joined; ignoring");
            return Ok(());
        }

        let lock = self.sessions.room_lock(room_id);
        let _guard = lock.lock().await;

        let Some(mut room) = self.store.get(room_id).await? else {
            debug!("Move for unknown room {room_id}; ignoring");
            return Ok(());
        };

        if room.is_finished {
            debug!("Move in finished room {room_id}; ignoring");
            return Ok(());
        }
        let Some(cell) = room.board.cell(cell_index) else {
            debug!("Move with out-of-range index {cell_index} in {room_id}; ignoring");
            return Ok(());
        };
        if !cell.is_empty() {
            debug!("Move on occupied cell {cell_index} in {room_id}; ignoring");
            return Ok(());
        }
        if claimed_role != room.current_player {
            debug!("Out-of-turn move by {claimed_role} in {room_id}; ignoring");
            return Ok(());
        }
        if room.role_of(&session.player_identity) != Some(claimed_role) {
            debug!(
                "{} does not hold role {claimed_role} in {room_id}; ignoring",
                session.player_identity
            );
            return Ok(());
        }

        room.board.place(cell_index, claimed_role);
        match evaluate(&room.board) {
            Outcome::Win { mark, .. } => {
                room.is_finished = true;
                match mark {
                    Mark::X => room.score_x += 1,
                    Mark::O => room.score_o += 1,
                }
            }
            Outcome::Draw => {
                room.is_finished = true;
            }
            Outcome::InProgress => {
                room.current_player = claimed_role.opponent();
            }
        }

        // Commit before telling anyone.
        self.store
            .apply_move(
                room_id,
                &room.board,
                room.current_player,
                room.is_finished,
                room.score_x,
                room.score_o,
            )
            .await?;

        self.broadcast(room_id, &ServerMessage::UpdateGame((&room).into()))
            .await?;

        debug!(
            "{} played cell {cell_index} in {room_id} (finished: {})",
            claimed_role, room.is_finished
        );
        Ok(())
    }

    /// Start a new round. Callable in any state, including mid-round
    /// (treated as giving up the current one); unknown rooms are a
    /// no-op.
    async fn handle_reset(&self, room_id: &str) -> Result<(), ServerError> {
        let lock = self.sessions.room_lock(room_id);
        let _guard = lock.lock().await;

        let Some(mut room) = self.store.get(room_id).await? else {
            debug!("Reset for unknown room {room_id}; ignoring");
            return Ok(());
        };

        self.store.reset(room_id).await?;

        room.board = Board::new();
        room.current_player = Mark::X;
        room.is_finished = false;

        self.broadcast(room_id, &ServerMessage::UpdateGame((&room).into()))
            .await?;

        info!("Room {room_id} reset for a new round");
        Ok(())
    }

    /// Membership cleanup for a closed connection. The identity keeps
    /// its role in the store; nothing is broadcast.
    pub async fn handle_disconnect(&self, connection_id: ConnectionId) {
        if let Some(session) = self.sessions.remove_connection(connection_id) {
            info!(
                "Player {} left room {} (connection {connection_id})",
                session.player_identity, session.room_id
            );
        }
    }

    async fn send(
        &self,
        connection_id: ConnectionId,
        message: &ServerMessage,
    ) -> Result<(), ServerError> {
        let text = serde_json::to_string(message)?;
        self.sender.send_text(connection_id, text).await
    }

    /// Fan a message out to every connection registered to the room.
    /// Individual delivery failures are logged, not propagated - one
    /// dead client must not block the rest of the room.
    async fn broadcast(&self, room_id: &str, message: &ServerMessage) -> Result<(), ServerError> {
        let text = serde_json::to_string(message)?;
        for member in self.sessions.members_of(room_id) {
            if let Err(e) = self.sender.send_text(member, text.clone()).await {
                debug!("Broadcast to {member} failed: {e}");
            }
        }
        Ok(())
    }

    async fn broadcast_except(
        &self,
        room_id: &str,
        skip: ConnectionId,
        message: &ServerMessage,
    ) -> Result<(), ServerError> {
        let text = serde_json::to_string(message)?;
        for member in self.sessions.members_of(room_id) {
            if member == skip {
                continue;
            }
            if let Err(e) = self.sender.send_text(member, text.clone()).await {
                debug!("Broadcast to {member} failed: {e}");
            }
        }
        Ok(())
    }
}
