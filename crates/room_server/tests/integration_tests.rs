//! End-to-end tests over a real WebSocket connection.
//!
//! Each test starts a full server on its own port with an in-memory
//! SQLite store, connects real clients with tokio-tungstenite, and
//! asserts on the exact frames the protocol emits.

use futures::{SinkExt, StreamExt};
use room_server::config::ServerConfig;
use room_server::store::SqliteRoomStore;
use room_server::GameServer;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server(port: u16) -> Arc<GameServer> {
    let config = ServerConfig {
        listen_addr: format!("127.0.0.1:{port}").parse().unwrap(),
        max_connections: 100,
        database_path: PathBuf::from("unused-in-tests.db"),
    };
    let store = Arc::new(SqliteRoomStore::in_memory().unwrap());
    let server = Arc::new(GameServer::new(config, store));

    let task_server = server.clone();
    tokio::spawn(async move {
        task_server.start().await.expect("server failed to start");
    });

    // Wait until the listener accepts connections.
    for _ in 0..50 {
        if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
            return server;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("server did not start listening on port {port}");
}

async fn connect(port: u16) -> WsClient {
    let (ws, _) = connect_async(format!("ws://127.0.0.1:{port}"))
        .await
        .expect("client failed to connect");
    ws
}

async fn send(ws: &mut WsClient, value: Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("failed to send frame");
}

async fn recv_json(ws: &mut WsClient) -> Value {
    timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(text.as_str()).expect("non-JSON frame");
                }
                Some(Ok(_)) => continue,
                other => panic!("connection ended unexpectedly: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a frame")
}

fn join_frame(room: &str, identity: &str) -> Value {
    json!({"event": "join-room", "data": {"roomId": room, "playerIdentity": identity}})
}

fn move_frame(room: &str, index: usize, role: &str) -> Value {
    json!({"event": "make-move", "data": {"roomId": room, "cellIndex": index, "claimedRole": role}})
}

#[tokio::test(flavor = "multi_thread")]
async fn full_round_over_websocket() {
    let server = start_server(9301).await;

    let mut c1 = connect(9301).await;
    send(&mut c1, join_frame("r1", "p1")).await;

    let assignment = recv_json(&mut c1).await;
    assert_eq!(assignment["event"], "player-assignment");
    assert_eq!(assignment["data"]["role"], "X");

    let init = recv_json(&mut c1).await;
    assert_eq!(init["event"], "init-state");
    assert_eq!(init["data"]["currentPlayer"], "X");
    assert_eq!(init["data"]["isFinished"], false);

    let mut c2 = connect(9301).await;
    send(&mut c2, join_frame("r1", "p2")).await;

    let assignment = recv_json(&mut c2).await;
    assert_eq!(assignment["data"]["role"], "O");
    let _init = recv_json(&mut c2).await;

    let joined = recv_json(&mut c1).await;
    assert_eq!(joined["event"], "user-joined");
    assert_eq!(joined["data"]["playerIdentity"], "p2");

    // X plays the center; both clients get the same snapshot.
    send(&mut c1, move_frame("r1", 4, "X")).await;
    for ws in [&mut c1, &mut c2] {
        let update = recv_json(ws).await;
        assert_eq!(update["event"], "update-game");
        assert_eq!(update["data"]["board"][4], "X");
        assert_eq!(update["data"]["currentPlayer"], "O");
    }

    send(&mut c2, move_frame("r1", 0, "O")).await;
    for ws in [&mut c1, &mut c2] {
        let update = recv_json(ws).await;
        assert_eq!(update["data"]["board"][0], "O");
        assert_eq!(update["data"]["currentPlayer"], "X");
    }

    // Occupied cell: silently rejected. The next frame anyone sees is
    // the reset snapshot, not an update for the illegal move.
    send(&mut c1, move_frame("r1", 0, "X")).await;
    send(&mut c1, json!({"event": "reset-game", "data": {"roomId": "r1"}})).await;

    for ws in [&mut c1, &mut c2] {
        let update = recv_json(ws).await;
        assert_eq!(update["event"], "update-game");
        assert_eq!(update["data"]["board"], json!(["", "", "", "", "", "", "", "", ""]));
        assert_eq!(update["data"]["currentPlayer"], "X");
        assert_eq!(update["data"]["isFinished"], false);
    }

    server.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn viewer_assignment_and_role_resumption() {
    let server = start_server(9302).await;

    let mut c1 = connect(9302).await;
    send(&mut c1, join_frame("r1", "p1")).await;
    assert_eq!(recv_json(&mut c1).await["data"]["role"], "X");
    let _init = recv_json(&mut c1).await;

    let mut c2 = connect(9302).await;
    send(&mut c2, join_frame("r1", "p2")).await;
    assert_eq!(recv_json(&mut c2).await["data"]["role"], "O");
    let _init = recv_json(&mut c2).await;

    // Third identity only watches.
    let mut c3 = connect(9302).await;
    send(&mut c3, join_frame("r1", "p3")).await;
    assert_eq!(recv_json(&mut c3).await["data"]["role"], "viewer");

    // p1 drops and reconnects: same identity, same role, no new slot.
    c1.close(None).await.unwrap();
    let mut c1b = connect(9302).await;
    send(&mut c1b, join_frame("r1", "p1")).await;
    assert_eq!(recv_json(&mut c1b).await["data"]["role"], "X");

    let init = recv_json(&mut c1b).await;
    assert_eq!(init["event"], "init-state");

    server.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn win_updates_score_for_whole_room() {
    let server = start_server(9303).await;

    let mut c1 = connect(9303).await;
    send(&mut c1, join_frame("r1", "p1")).await;
    let _ = recv_json(&mut c1).await;
    let _ = recv_json(&mut c1).await;

    let mut c2 = connect(9303).await;
    send(&mut c2, join_frame("r1", "p2")).await;
    let _ = recv_json(&mut c2).await;
    let _ = recv_json(&mut c2).await;
    let _user_joined = recv_json(&mut c1).await;

    // X takes the top row: 0, 1, 2.
    for (ws_move, index, role) in [
        (0usize, 0usize, "X"),
        (1, 3, "O"),
        (0, 1, "X"),
        (1, 4, "O"),
        (0, 2, "X"),
    ] {
        let ws = if ws_move == 0 { &mut c1 } else { &mut c2 };
        send(ws, move_frame("r1", index, role)).await;
        let _ = recv_json(&mut c1).await;
        let update = recv_json(&mut c2).await;
        assert_eq!(update["event"], "update-game");
    }

    // Last snapshot seen by the viewer side of the loop above came from
    // c2; re-check the final state via one more round of frames after a
    // reset request.
    send(&mut c2, json!({"event": "reset-game", "data": {"roomId": "r1"}})).await;
    let update = recv_json(&mut c1).await;
    assert_eq!(update["data"]["scores"]["X"], 1);
    assert_eq!(update["data"]["scores"]["O"], 0);
    assert_eq!(update["data"]["isFinished"], false);

    server.shutdown().await.unwrap();
}
