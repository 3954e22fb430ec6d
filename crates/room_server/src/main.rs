//! Tic-Tac-Toe Room Server - main entry point.
//!
//! Parses CLI arguments, sets up logging, loads the TOML configuration,
//! opens the SQLite room store, and runs the WebSocket server until a
//! termination signal arrives.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use room_server::config::{self, Args};
use room_server::store::SqliteRoomStore;
use room_server::{logging, shutdown, GameServer};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::setup_logging(&args)?;

    info!("Starting tic-tac-toe room server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(&args).await?;
    let server_config = config::resolve(&config, &args)?;
    info!("Listen address: {}", server_config.listen_addr);
    info!("Database: {}", server_config.database_path.display());

    let store = Arc::new(SqliteRoomStore::open(&server_config.database_path)?);
    let server = GameServer::new(server_config, store);

    let shutdown_receiver = shutdown::setup_shutdown_handler().await;

    tokio::select! {
        result = server.start() => {
            match result {
                Ok(()) => info!("Server stopped normally"),
                Err(e) => {
                    error!("Server error: {e}");
                    return Err(e.into());
                }
            }
        }
        _ = shutdown_receiver => {
            info!("Shutdown signal received");
            server.shutdown().await?;
        }
    }

    Ok(())
}
