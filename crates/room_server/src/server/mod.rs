//! Server orchestration: component wiring and the accept loop.

pub mod core;

pub use core::GameServer;
