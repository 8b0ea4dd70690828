//! End-to-end tests against a live server on a loopback port

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use roomcast::{RelayServer, RoomId, ServerConfig};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(2);

struct TestServer {
    server: Arc<RelayServer>,
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<roomcast::Result<()>>,
}

impl TestServer {
    async fn start(config: ServerConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(RelayServer::new(config));
        let (tx, rx) = oneshot::channel::<()>();

        let serving = Arc::clone(&server);
        let task = tokio::spawn(async move {
            serving
                .serve(listener, async {
                    let _ = rx.await;
                })
                .await
        });

        Self {
            server,
            addr,
            shutdown: Some(tx),
            task,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    async fn join(&self, room: &str) -> Client {
        let (ws, _) = connect_async(self.url(&format!("/ws/chat/{room}")))
            .await
            .unwrap();
        ws
    }

    async fn wait_for_members(&self, room: &str, count: usize) {
        let room = RoomId::new(room);
        let registry = self.server.registry();
        tokio::time::timeout(WAIT, async {
            while registry.member_count(&room).await != count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("room {room} never reached {count} members"));
    }

    async fn wait_for(&self, check: impl Fn(&roomcast::stats::ServerStats) -> bool) {
        tokio::time::timeout(WAIT, async {
            while !check(&self.server.stats()) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("server stats never matched");
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.task.await.unwrap().unwrap();
    }
}

async fn recv_text(ws: &mut Client) -> String {
    let msg = tokio::time::timeout(WAIT, ws.next())
        .await
        .expect("timed out waiting for message")
        .expect("connection ended")
        .expect("read failed");
    msg.to_text().unwrap().to_owned()
}

async fn assert_silent(ws: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(result.is_err(), "unexpected message: {result:?}");
}

#[tokio::test]
async fn test_messages_stay_in_their_room() {
    let server = TestServer::start(ServerConfig::default()).await;

    let mut a = server.join("r1").await;
    let mut b = server.join("r1").await;
    let mut c = server.join("r2").await;
    server.wait_for_members("r1", 2).await;
    server.wait_for_members("r2", 1).await;

    a.send(Message::text("hi")).await.unwrap();

    assert_eq!(recv_text(&mut b).await, "hi");
    assert_eq!(recv_text(&mut a).await, "hi");
    assert_silent(&mut c).await;

    server.stop().await;
}

#[tokio::test]
async fn test_payload_relayed_unchanged() {
    let server = TestServer::start(ServerConfig::default()).await;

    let mut a = server.join("json").await;
    let mut b = server.join("json").await;
    server.wait_for_members("json", 2).await;

    let payload = r#"{"user":"ana","text":"olá 👋"}"#;
    a.send(Message::text(payload)).await.unwrap();

    assert_eq!(recv_text(&mut b).await, payload);

    server.stop().await;
}

#[tokio::test]
async fn test_disconnect_leaves_room() {
    let server = TestServer::start(ServerConfig::default()).await;

    let mut a = server.join("r1").await;
    let mut b = server.join("r1").await;
    server.wait_for_members("r1", 2).await;

    b.close(None).await.unwrap();
    server.wait_for_members("r1", 1).await;

    a.send(Message::text("hello")).await.unwrap();
    assert_eq!(recv_text(&mut a).await, "hello");

    drop(a);
    let registry = server.server.registry();
    tokio::time::timeout(WAIT, async {
        while registry.room_count().await != 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("room was not removed after last member left");

    server.stop().await;
}

#[tokio::test]
async fn test_room_names_are_decoded() {
    let server = TestServer::start(ServerConfig::default()).await;

    let _a = server.join("math%20101").await;
    server.wait_for_members("math 101", 1).await;

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_path_rejected() {
    let server = TestServer::start(ServerConfig::default()).await;

    let err = connect_async(server.url("/ws/lobby")).await.unwrap_err();
    match err {
        WsError::Http(response) => assert_eq!(response.status(), StatusCode::NOT_FOUND),
        other => panic!("expected HTTP rejection, got {other:?}"),
    }

    server.wait_for(|stats| stats.failed_handshakes == 1).await;
    assert_eq!(server.server.registry().room_count().await, 0);

    server.stop().await;
}

#[tokio::test]
async fn test_connection_limit() {
    let server = TestServer::start(ServerConfig::default().max_connections(1)).await;

    let _a = server.join("r1").await;
    server.wait_for_members("r1", 1).await;

    assert!(connect_async(server.url("/ws/chat/r1")).await.is_err());
    server.wait_for(|stats| stats.rejected_connections == 1).await;

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_keeps_live_sessions() {
    let server = TestServer::start(ServerConfig::default()).await;

    let mut a = server.join("r1").await;
    server.wait_for_members("r1", 1).await;

    let registry = Arc::clone(server.server.registry());
    server.stop().await;

    a.send(Message::text("still up")).await.unwrap();
    assert_eq!(recv_text(&mut a).await, "still up");
    assert_eq!(registry.member_count(&RoomId::new("r1")).await, 1);
}
