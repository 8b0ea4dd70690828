//! Session handles
//!
//! A [`SessionHandle`] is the registry-facing side of one connection: its id
//! plus the shared send half. The session loop owns the connection; the
//! registry only keeps a clone of the handle while the session is a member.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::{Sink, SinkExt};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};

use crate::registry::{DeliveryError, SessionId};

/// Send half of a session's transport
///
/// Implemented for every `Sink<Message>`, which covers the split WebSocket
/// stream as well as in-memory channels.
pub trait Outbound: Send + Unpin + 'static {
    /// Write one text message to the peer
    fn deliver(&mut self, text: Utf8Bytes)
        -> impl Future<Output = Result<(), DeliveryError>> + Send;

    /// Close the send half, ignoring failures
    fn shutdown(&mut self) -> impl Future<Output = ()> + Send;
}

impl<T> Outbound for T
where
    T: Sink<Message> + Send + Unpin + 'static,
    T::Error: fmt::Display,
{
    async fn deliver(&mut self, text: Utf8Bytes) -> Result<(), DeliveryError> {
        self.send(Message::Text(text))
            .await
            .map_err(|e| DeliveryError::new(e.to_string()))
    }

    async fn shutdown(&mut self) {
        let _ = self.close().await;
    }
}

/// Handle to one live session
///
/// Clones share the same send half. Writes from concurrent broadcasts are
/// serialized by a per-session mutex, independent of the registry lock.
pub struct SessionHandle<S> {
    id: SessionId,
    outbound: Arc<Mutex<S>>,
}

impl<S> Clone for SessionHandle<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            outbound: Arc::clone(&self.outbound),
        }
    }
}

impl<S> fmt::Debug for SessionHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle").field("id", &self.id).finish()
    }
}

impl<S> SessionHandle<S> {
    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl<S: Outbound> SessionHandle<S> {
    pub fn new(id: SessionId, outbound: S) -> Self {
        Self {
            id,
            outbound: Arc::new(Mutex::new(outbound)),
        }
    }

    /// Deliver one text message to this session
    pub async fn deliver(&self, text: Utf8Bytes) -> Result<(), DeliveryError> {
        let mut outbound = self.outbound.lock().await;
        outbound.deliver(text).await
    }

    /// Close the send half
    pub async fn shutdown(&self) {
        let mut outbound = self.outbound.lock().await;
        outbound.shutdown().await;
    }
}
