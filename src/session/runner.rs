//! Per-connection session loop
//!
//! Bridges one upgraded connection to the registry for its whole lifetime:
//! join the room, relay every inbound text message to the room, leave the
//! room when the peer goes away.

use std::fmt;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::registry::{RoomId, RoomRegistry, SessionId};
use crate::stats::SessionStats;

use super::context::SessionContext;
use super::handle::{Outbound, SessionHandle};
use super::state::{CloseReason, SessionState};

/// How a session ended
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub reason: CloseReason,
    pub stats: SessionStats,
}

/// Session loop for one connection
pub struct SessionLoop<S: Outbound> {
    context: SessionContext,
    registry: Arc<RoomRegistry<S>>,
    handle: SessionHandle<S>,
    state: SessionState,
    stats: SessionStats,
}

impl<S: Outbound> SessionLoop<S> {
    /// Create a session in the `Connecting` phase
    pub fn new(context: SessionContext, registry: Arc<RoomRegistry<S>>, outbound: S) -> Self {
        let handle = SessionHandle::new(context.session_id, outbound);

        Self {
            context,
            registry,
            handle,
            state: SessionState::new(),
            stats: SessionStats::new(),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run the session until the inbound side ends
    ///
    /// Every exit from the relay loop deregisters the session. If this future
    /// is dropped while active, deregistration is handed off to the runtime.
    pub async fn run<R, E>(mut self, mut inbound: R) -> SessionOutcome
    where
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
    {
        let room = self.context.room.clone();
        let session_id = self.context.session_id;

        if let Err(e) = self.registry.register(&room, self.handle.clone()).await {
            tracing::warn!(
                session_id = %session_id,
                room = %room,
                error = %e,
                "Session refused by registry"
            );
            return self.finish(CloseReason::RegisterFailed).await;
        }

        let membership = Membership {
            registry: Arc::clone(&self.registry),
            room,
            session: session_id,
            armed: true,
        };
        self.state.activate();

        let reason = self.relay(&mut inbound).await;

        membership.release().await;
        self.finish(reason).await
    }

    async fn relay<R, E>(&mut self, inbound: &mut R) -> CloseReason
    where
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
    {
        loop {
            match inbound.next().await {
                Some(Ok(Message::Text(text))) => {
                    self.stats.record_message(text.as_str().len());
                    let report = self.registry.broadcast(&self.context.room, text).await;
                    self.stats.record_broadcast(&report);
                }
                Some(Ok(Message::Binary(data))) => {
                    self.stats.ignored_frames += 1;
                    tracing::debug!(
                        session_id = %self.context.session_id,
                        len = data.len(),
                        "Ignoring binary frame"
                    );
                }
                Some(Ok(Message::Close(_))) => return CloseReason::PeerClosed,
                // Ping/pong are answered by the transport
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(
                        session_id = %self.context.session_id,
                        error = %e,
                        "Read failed"
                    );
                    return CloseReason::ReadError;
                }
                None => return CloseReason::StreamEnded,
            }
        }
    }

    async fn finish(mut self, reason: CloseReason) -> SessionOutcome {
        self.state.close(reason);
        self.handle.shutdown().await;
        self.stats.duration = self.state.duration();

        tracing::debug!(
            session_id = %self.context.session_id,
            peer = %self.context.peer_addr,
            room = %self.context.room,
            reason = %reason,
            messages = self.stats.messages_received,
            failed_deliveries = self.stats.deliveries_failed,
            "Session closed"
        );

        SessionOutcome {
            reason,
            stats: self.stats,
        }
    }
}

/// Room membership held by an active session
///
/// `release` deregisters explicitly. If the guard is dropped still armed
/// (task aborted, panic), the deregistration is spawned instead.
struct Membership<S: Outbound> {
    registry: Arc<RoomRegistry<S>>,
    room: RoomId,
    session: SessionId,
    armed: bool,
}

impl<S: Outbound> Membership<S> {
    async fn release(mut self) {
        self.registry.deregister(&self.room, self.session).await;
        self.armed = false;
    }
}

impl<S: Outbound> Drop for Membership<S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                session_id = %self.session,
                room = %self.room,
                "No runtime to deregister dropped session"
            );
            return;
        };

        let registry = Arc::clone(&self.registry);
        let room = self.room.clone();
        let session = self.session;
        runtime.spawn(async move {
            registry.deregister(&room, session).await;
        });
    }
}
