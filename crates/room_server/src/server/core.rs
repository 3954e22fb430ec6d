//! Core room server implementation.
//!
//! `GameServer` wires the connection manager, session manager, and move
//! protocol handler together around an injected room store, then runs
//! the TCP accept loop until shutdown.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::connection::ConnectionManager;
use crate::error::ServerError;
use crate::messaging::MessageHandler;
use crate::session::RoomSessionManager;
use crate::store::RoomStore;

/// The core room server.
///
/// Owns no game state itself: rooms live in the injected [`RoomStore`],
/// live connections in the [`ConnectionManager`], and room membership in
/// the [`RoomSessionManager`]. The store is injected so tests can run
/// the full server against an in-memory implementation.
pub struct GameServer {
    config: ServerConfig,
    connection_manager: Arc<ConnectionManager>,
    handler: Arc<MessageHandler>,
    shutdown_sender: broadcast::Sender<()>,
}

impl GameServer {
    /// Creates a new server around the given store.
    pub fn new(config: ServerConfig, store: Arc<dyn RoomStore>) -> Self {
        let connection_manager = Arc::new(ConnectionManager::new());
        let sessions = Arc::new(RoomSessionManager::new(store.clone()));
        let handler = Arc::new(MessageHandler::new(
            sessions,
            store,
            connection_manager.clone(),
        ));
        let (shutdown_sender, _) = broadcast::channel(1);

        Self {
            config,
            connection_manager,
            handler,
            shutdown_sender,
        }
    }

    /// Binds the listen address and accepts connections until shutdown.
    ///
    /// Each accepted connection gets its own task running the WebSocket
    /// handshake and read loop; the accept loop itself never blocks on a
    /// client.
    pub async fn start(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.listen_addr)
            .await
            .map_err(|e| ServerError::Network(format!("bind failed: {e}")))?;
        info!("Room server listening on {}", self.config.listen_addr);

        let mut shutdown_receiver = self.shutdown_sender.subscribe();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            if self.connection_manager.connection_count()
                                >= self.config.max_connections
                            {
                                warn!("Connection limit reached; rejecting {addr}");
                                continue;
                            }

                            let connection_manager = self.connection_manager.clone();
                            let handler = self.handler.clone();
                            tokio::spawn(async move {
                                connection_manager
                                    .handle_new_connection(stream, addr, handler)
                                    .await;
                            });
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {e}");
                        }
                    }
                }
                _ = shutdown_receiver.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.connection_manager.shutdown_all().await;
        info!("Server stopped");
        Ok(())
    }

    /// Signals the accept loop to stop and close all connections.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("Shutting down server...");
        let _ = self.shutdown_sender.send(());
        Ok(())
    }

    /// Number of currently connected clients.
    pub fn connection_count(&self) -> usize {
        self.connection_manager.connection_count()
    }
}
