//! Session context
//!
//! Identity of a session as carried through the session loop and its logs.

use std::net::SocketAddr;

use crate::registry::{RoomId, SessionId};

/// Who a session is and where it is connected
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Unique session ID
    pub session_id: SessionId,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Room taken from the upgrade path
    pub room: RoomId,
}

impl SessionContext {
    /// Create a new context
    pub fn new(session_id: SessionId, peer_addr: SocketAddr, room: RoomId) -> Self {
        Self {
            session_id,
            peer_addr,
            room,
        }
    }
}
