//! Room registry implementation
//!
//! The central registry that tracks which sessions are in which room and
//! relays messages to them.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Utf8Bytes;

use crate::session::{Outbound, SessionHandle};
use crate::stats::RegistryStats;

use super::delivery::{fan_out, DeliveryReport};
use super::entry::RoomEntry;
use super::error::RegistryError;
use super::key::{RoomId, SessionId};

/// Membership tables, guarded together by the registry lock
struct Rooms<S> {
    /// Room to members
    entries: HashMap<RoomId, RoomEntry<S>>,

    /// Member to room, so a session can be in at most one room
    index: HashMap<SessionId, RoomId>,
}

/// Central registry for all active rooms
///
/// One mutex covers every read and write of the membership tables. It is
/// held for map updates and snapshot copies only, never while writing to a
/// socket.
pub struct RoomRegistry<S> {
    rooms: Mutex<Rooms<S>>,
}

impl<S> RoomRegistry<S> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(Rooms {
                entries: HashMap::new(),
                index: HashMap::new(),
            }),
        }
    }

    /// Add a session to a room
    ///
    /// The room is created if this is its first member. Registering a session
    /// that is already a member of any room is rejected and leaves the
    /// registry untouched.
    pub async fn register(
        &self,
        room: &RoomId,
        session: SessionHandle<S>,
    ) -> Result<(), RegistryError> {
        let id = session.id();

        let (members, created) = {
            let mut rooms = self.rooms.lock().await;
            let Rooms { entries, index } = &mut *rooms;

            if let Some(current) = index.get(&id) {
                return Err(RegistryError::AlreadyRegistered {
                    session: id,
                    room: current.clone(),
                });
            }

            let created = !entries.contains_key(room);
            let entry = entries.entry(room.clone()).or_insert_with(RoomEntry::new);
            entry.push(session);
            index.insert(id, room.clone());

            (entry.len(), created)
        };

        if created {
            tracing::info!(room = %room, session_id = %id, "Session joined (new room)");
        } else {
            tracing::info!(
                room = %room,
                session_id = %id,
                members = members,
                "Session joined"
            );
        }

        Ok(())
    }

    /// Remove a session from a room
    ///
    /// Removing a session that is not a member is a no-op. The room entry is
    /// dropped together with its last member. Returns whether a member was
    /// removed.
    pub async fn deregister(&self, room: &RoomId, session: SessionId) -> bool {
        let remaining = {
            let mut rooms = self.rooms.lock().await;
            let Rooms { entries, index } = &mut *rooms;

            let Some(entry) = entries.get_mut(room) else {
                return false;
            };
            if entry.remove(session).is_none() {
                return false;
            }
            index.remove(&session);

            let remaining = entry.len();
            if remaining == 0 {
                entries.remove(room);
            }
            remaining
        };

        if remaining == 0 {
            tracing::info!(room = %room, session_id = %session, "Session left, room closed");
        } else {
            tracing::info!(
                room = %room,
                session_id = %session,
                members = remaining,
                "Session left"
            );
        }

        true
    }

    /// Point-in-time copy of a room's members, in join order
    pub async fn snapshot(&self, room: &RoomId) -> Vec<SessionHandle<S>> {
        let rooms = self.rooms.lock().await;
        rooms
            .entries
            .get(room)
            .map(RoomEntry::snapshot)
            .unwrap_or_default()
    }

    /// Check whether a room currently has members
    pub async fn contains_room(&self, room: &RoomId) -> bool {
        self.rooms.lock().await.entries.contains_key(room)
    }

    /// Number of members in a room (0 for unknown rooms)
    pub async fn member_count(&self, room: &RoomId) -> usize {
        self.rooms
            .lock()
            .await
            .entries
            .get(room)
            .map_or(0, RoomEntry::len)
    }

    /// Member ids of a room in join order
    pub async fn members(&self, room: &RoomId) -> Vec<SessionId> {
        self.rooms
            .lock()
            .await
            .entries
            .get(room)
            .map(RoomEntry::member_ids)
            .unwrap_or_default()
    }

    /// Room a session currently belongs to
    pub async fn room_of(&self, session: SessionId) -> Option<RoomId> {
        self.rooms.lock().await.index.get(&session).cloned()
    }

    /// Get total number of rooms
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.entries.len()
    }

    /// Get total number of registered sessions
    pub async fn session_count(&self) -> usize {
        self.rooms.lock().await.index.len()
    }

    /// Occupancy snapshot
    pub async fn stats(&self) -> RegistryStats {
        let rooms = self.rooms.lock().await;
        RegistryStats {
            room_count: rooms.entries.len(),
            session_count: rooms.index.len(),
        }
    }
}

impl<S: Outbound> RoomRegistry<S> {
    /// Broadcast a text message to every member of a room
    ///
    /// Members are copied out under the lock, then written to with the lock
    /// released. An empty or unknown room is a no-op. Per-member failures are
    /// isolated and only show up in the returned report.
    pub async fn broadcast(&self, room: &RoomId, text: Utf8Bytes) -> DeliveryReport {
        let sessions = self.snapshot(room).await;

        if sessions.is_empty() {
            tracing::trace!(room = %room, "Broadcast to empty room");
            return DeliveryReport::default();
        }

        let report = fan_out(room, &sessions, text).await;

        tracing::trace!(
            room = %room,
            attempted = report.attempted,
            failed = report.failed,
            "Broadcast complete"
        );

        report
    }
}

impl<S> Default for RoomRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
