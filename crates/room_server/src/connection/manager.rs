//! WebSocket connection manager.
//!
//! Handles the WebSocket handshake, runs the per-connection read loop,
//! and owns the map of live outbound sinks used for room broadcast.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::ConnectionId;
use crate::error::ServerError;
use crate::messaging::MessageHandler;

/// Type alias for WebSocket stream
type WsStream = WebSocketStream<TcpStream>;
/// Type alias for WebSocket sink (outgoing messages)
pub type WsSink = SplitSink<WsStream, Message>;
/// Type alias for WebSocket receiver (incoming messages)
type WsReceiver = SplitStream<WsStream>;

/// Outbound delivery seam between the message handler and the transport.
///
/// The handler only ever needs "send this text frame to that
/// connection", so tests can substitute a recording fake and assert on
/// the exact frames the protocol produced.
#[async_trait]
pub trait ClientSender: Send + Sync {
    async fn send_text(&self, connection_id: ConnectionId, text: String)
        -> Result<(), ServerError>;
}

/// Manages WebSocket connections.
///
/// The ConnectionManager handles:
/// - WebSocket handshake and connection establishment
/// - Feeding inbound text frames to the message handler
/// - Connection cleanup on disconnect
/// - Outbound delivery for room broadcasts
pub struct ConnectionManager {
    /// Active WebSocket sinks mapped by connection id. Each sink sits
    /// behind its own async mutex; senders clone the handle out of the
    /// map first, so no map shard lock is ever held across an await and
    /// one slow client cannot stall fan-out to the rest of the room.
    connections: DashMap<ConnectionId, Arc<Mutex<WsSink>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Handle a new incoming TCP connection.
    ///
    /// Performs the WebSocket handshake, registers the outbound sink,
    /// then runs the read loop until the client disconnects. Membership
    /// cleanup happens through the handler so the session manager drops
    /// the connection from its room (identity/role bindings in the store
    /// are left intact for reconnection).
    pub async fn handle_new_connection(
        self: Arc<Self>,
        stream: TcpStream,
        addr: SocketAddr,
        handler: Arc<MessageHandler>,
    ) {
        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                error!("WebSocket handshake failed for {addr}: {e}");
                return;
            }
        };

        let (ws_sink, ws_receiver) = ws_stream.split();
        let connection_id = ConnectionId::new();

        self.connections
            .insert(connection_id, Arc::new(Mutex::new(ws_sink)));
        info!("Connection {connection_id} established from {addr}");

        self.read_loop(connection_id, ws_receiver, handler.clone())
            .await;

        handler.handle_disconnect(connection_id).await;
        self.connections.remove(&connection_id);
        info!("Connection {connection_id} from {addr} closed");
    }

    /// Handle incoming frames from a single connection until it closes.
    async fn read_loop(
        &self,
        connection_id: ConnectionId,
        mut ws_receiver: WsReceiver,
        handler: Arc<MessageHandler>,
    ) {
        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(e) = handler.handle_message(&text, connection_id).await {
                        // Only storage failures propagate to here; the
                        // request is dropped without corrupting state.
                        error!("Error handling message from {connection_id}: {e}");
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("Connection {connection_id} requested close");
                    break;
                }
                Ok(Message::Ping(data)) => {
                    if let Some(sink) = self.sink(connection_id) {
                        let _ = sink.lock().await.send(Message::Pong(data)).await;
                    }
                }
                Ok(Message::Pong(_)) => {
                    // Connection is alive.
                }
                Err(e) => {
                    error!("WebSocket error for connection {connection_id}: {e}");
                    break;
                }
                _ => {
                    warn!("Unsupported message type from {connection_id}");
                }
            }
        }
    }

    /// The sink handle for a connection, cloned out of the map so the
    /// shard lock is released before anyone awaits a send on it.
    fn sink(&self, connection_id: ConnectionId) -> Option<Arc<Mutex<WsSink>>> {
        self.connections
            .get(&connection_id)
            .map(|entry| entry.value().clone())
    }

    /// Number of currently connected clients.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Close all connections gracefully.
    pub async fn shutdown_all(&self) {
        let sinks: Vec<_> = self
            .connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for sink in sinks {
            let _ = sink.lock().await.send(Message::Close(None)).await;
        }
        self.connections.clear();
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientSender for ConnectionManager {
    async fn send_text(
        &self,
        connection_id: ConnectionId,
        text: String,
    ) -> Result<(), ServerError> {
        let Some(sink) = self.sink(connection_id) else {
            // Already disconnected; the broadcast moves on.
            return Ok(());
        };
        let result = sink
            .lock()
            .await
            .send(Message::text(text))
            .await
            .map_err(|e| ServerError::Network(format!("failed to send message: {e}")));
        result
    }
}
