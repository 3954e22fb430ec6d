//! Configuration for the room server.
//!
//! Command-line arguments, TOML configuration file parsing, and the
//! resolved runtime configuration the server actually consumes.

pub mod args;
pub mod settings;

pub use args::Args;
pub use settings::{Config, ServerSettings, StorageSettings};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

/// Resolved runtime configuration: file settings with CLI overrides
/// applied and addresses parsed.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub max_connections: usize,
    pub database_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".parse().expect("static address"),
            max_connections: 1000,
            database_path: PathBuf::from("rooms.db"),
        }
    }
}

/// Load configuration from file or create a default configuration.
///
/// When the file does not exist, default settings are written to it so
/// the operator has something concrete to edit.
pub async fn load_config(args: &Args) -> Result<Config> {
    if !args.config.exists() {
        warn!(
            "Configuration file not found: {}, writing defaults",
            args.config.display()
        );
        let defaults = Config::default();
        tokio::fs::write(&args.config, toml::to_string_pretty(&defaults)?).await?;
        info!(
            "Created default configuration file: {}",
            args.config.display()
        );
        return Ok(defaults);
    }

    let raw = tokio::fs::read_to_string(&args.config).await?;
    toml::de::from_str(&raw)
        .with_context(|| format!("invalid configuration file {}", args.config.display()))
}

/// Apply CLI overrides on top of the file configuration.
pub fn resolve(config: &Config, args: &Args) -> Result<ServerConfig> {
    let listen_addr = args
        .listen
        .as_deref()
        .unwrap_or(&config.server.listen_addr)
        .parse()
        .map_err(|e| anyhow::anyhow!("failed to parse listen address: {e}"))?;

    let database_path = args
        .database
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.storage.database_path));

    Ok(ServerConfig {
        listen_addr,
        max_connections: config.server.max_connections,
        database_path,
    })
}
