//! Server error types.

use thiserror::Error;

/// Errors surfaced by server components.
///
/// Protocol violations by clients are not errors - they are silently
/// ignored per the room protocol. These variants cover genuine failures:
/// transport problems, durable-storage failures, and malformed outbound
/// serialization.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Connection, binding, or WebSocket protocol failure.
    #[error("network error: {0}")]
    Network(String),

    /// Durable store failure. Aborts the in-flight request; no snapshot
    /// is broadcast for state that was never committed.
    #[error("storage error: {0}")]
    Storage(#[from] crate::store::StoreError),

    /// Outbound message serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
