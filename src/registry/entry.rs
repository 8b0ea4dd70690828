//! Per-room membership entry
//!
//! This module defines the per-room state stored in the registry.

use crate::session::SessionHandle;

use super::key::SessionId;

/// Entry for a single room in the registry
///
/// Only ever touched while the registry lock is held.
pub struct RoomEntry<S> {
    /// Members in join order
    sessions: Vec<SessionHandle<S>>,
}

impl<S> RoomEntry<S> {
    pub(super) fn new() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Member ids in join order
    pub fn member_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|s| s.id()).collect()
    }

    pub(super) fn push(&mut self, session: SessionHandle<S>) {
        self.sessions.push(session);
    }

    /// Remove a member, preserving the order of the rest
    pub(super) fn remove(&mut self, id: SessionId) -> Option<SessionHandle<S>> {
        let pos = self.sessions.iter().position(|s| s.id() == id)?;
        Some(self.sessions.remove(pos))
    }

    /// Copy of the current members for delivery outside the lock
    pub(super) fn snapshot(&self) -> Vec<SessionHandle<S>> {
        self.sessions.clone()
    }
}
