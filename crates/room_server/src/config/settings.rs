//! Configuration file structures.

use serde::{Deserialize, Serialize};

/// Root configuration object, serialized to/from TOML.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Network settings
    pub server: ServerSettings,
    /// Durable storage settings
    pub storage: StorageSettings,
}

/// Network settings.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ServerSettings {
    /// Address to bind, "IP:PORT".
    pub listen_addr: String,

    /// Upper bound on concurrent WebSocket connections.
    pub max_connections: usize,
}

/// Durable storage settings.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StorageSettings {
    /// SQLite database file holding one row per room. Created on first
    /// run when missing.
    pub database_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                listen_addr: "127.0.0.1:3000".to_string(),
                max_connections: 1000,
            },
            storage: StorageSettings {
                database_path: "rooms.db".to_string(),
            },
        }
    }
}
