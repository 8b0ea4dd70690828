//! Accepted connection
//!
//! Runs the WebSocket upgrade for one accepted socket, routes it to a room
//! and hands the split stream to a [`SessionLoop`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::SplitSink;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_hdr_async, WebSocketStream};

use crate::error::{Error, Result};
use crate::registry::{RoomId, RoomRegistry, SessionId};
use crate::session::{SessionContext, SessionLoop, SessionOutcome};
use crate::stats::ServerCounters;

use super::route::{not_found, ChatRoute};

/// Send half of an upgraded connection
pub type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Registry over live WebSocket sessions
pub type WsRegistry = RoomRegistry<WsSink>;

/// One accepted TCP connection, not yet upgraded
pub struct Connection {
    session_id: SessionId,
    socket: TcpStream,
    peer_addr: SocketAddr,
    handshake_timeout: Duration,
    route: Arc<ChatRoute>,
    registry: Arc<WsRegistry>,
    counters: Arc<ServerCounters>,
}

impl Connection {
    pub fn new(
        session_id: SessionId,
        socket: TcpStream,
        peer_addr: SocketAddr,
        handshake_timeout: Duration,
        route: Arc<ChatRoute>,
        registry: Arc<WsRegistry>,
        counters: Arc<ServerCounters>,
    ) -> Self {
        Self {
            session_id,
            socket,
            peer_addr,
            handshake_timeout,
            route,
            registry,
            counters,
        }
    }

    /// Upgrade, then relay until the peer goes away
    pub async fn run(self) -> Result<SessionOutcome> {
        let Connection {
            session_id,
            socket,
            peer_addr,
            handshake_timeout,
            route,
            registry,
            counters,
        } = self;

        let (ws, room) = match handshake(socket, &route, handshake_timeout).await {
            Ok(accepted) => accepted,
            Err(e) => {
                counters.handshake_failed();
                return Err(e);
            }
        };

        tracing::debug!(
            session_id = %session_id,
            peer = %peer_addr,
            room = %room,
            "WebSocket upgraded"
        );

        let (sink, stream) = ws.split();
        let context = SessionContext::new(session_id, peer_addr, room);

        Ok(SessionLoop::new(context, registry, sink).run(stream).await)
    }
}

async fn handshake(
    socket: TcpStream,
    route: &ChatRoute,
    timeout: Duration,
) -> Result<(WebSocketStream<TcpStream>, RoomId)> {
    let mut routed = None;

    let callback = |request: &Request, response: Response| {
        let path = request.uri().path();
        match route.room_for_path(path) {
            Some(room) => {
                routed = Some(room);
                Ok(response)
            }
            None => {
                tracing::debug!(path = path, "Upgrade rejected: no such room path");
                Err(not_found(path))
            }
        }
    };

    let ws = tokio::time::timeout(timeout, accept_hdr_async(socket, callback))
        .await
        .map_err(|_| Error::HandshakeTimeout(timeout))??;

    let room = routed.ok_or(Error::UnknownRoute)?;
    Ok((ws, room))
}
