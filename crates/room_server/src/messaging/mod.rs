//! Wire message types and the move protocol handler.

pub mod handler;
pub mod types;

pub use handler::MessageHandler;
pub use types::{ClientMessage, GameSnapshot, Scores, ServerMessage};
