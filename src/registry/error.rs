//! Registry error types

use super::key::{RoomId, SessionId};

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Session is already a member of a room (caller bug)
    #[error("session {session} is already registered in room {room}")]
    AlreadyRegistered { session: SessionId, room: RoomId },
}

/// Failure to deliver one message to one session
///
/// Only ever observed inside a single broadcast; it is logged and dropped
/// there and never reaches the broadcaster's caller.
#[derive(Debug, Clone, thiserror::Error)]
#[error("delivery failed: {reason}")]
pub struct DeliveryError {
    reason: String,
}

impl DeliveryError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
