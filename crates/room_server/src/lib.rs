//! # Tic-Tac-Toe Room Server
//!
//! A real-time multiplayer tic-tac-toe server. Clients connect over
//! WebSocket, join a named room, are assigned a side (X, O, or viewer),
//! and exchange moves; every applied move is persisted and the resulting
//! snapshot is broadcast to the whole room.
//!
//! ## Architecture
//!
//! * **Connection Manager** - WebSocket lifecycle and outbound delivery
//! * **Room Session Manager** - room membership, role assignment, and
//!   per-room operation serialization
//! * **Move Protocol Handler** - validates and applies moves, invokes the
//!   rules evaluator, persists, then broadcasts
//! * **Room Store** - durable one-row-per-room SQLite storage behind an
//!   async trait, with an in-memory fake for tests
//!
//! ## Message Flow
//!
//! 1. Client sends a JSON text frame `{event, data}`
//! 2. The connection read loop hands the frame to the message handler
//! 3. The handler validates against stored room state under the room lock
//! 4. Changed state is committed to the store before anything is emitted
//! 5. The snapshot fans out to every connection registered to the room
//!
//! Protocol violations (wrong turn, occupied cell, finished game, viewer
//! moves) are rejected silently: no state change, no broadcast. Only
//! storage failures abort an in-flight request.

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::GameServer;

pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod server;
pub mod session;
pub mod shutdown;
pub mod store;
