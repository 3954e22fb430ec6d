//! Connection management for WebSocket clients.
//!
//! Tracks the lifecycle of client connections: handshake, the per-
//! connection read loop, outbound delivery, and cleanup on disconnect.

pub mod manager;

pub use manager::{ClientSender, ConnectionManager};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a client connection.
///
/// Connection ids are transient: a reconnecting client gets a fresh one.
/// The stable player identity used for role assignment travels in the
/// join payload instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
