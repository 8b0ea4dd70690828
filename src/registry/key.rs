//! Room and session identifiers

use std::fmt;
use std::sync::Arc;

/// Identifier of a chat room
///
/// Any non-empty string is a valid room. Cloning is cheap: the name is shared,
/// so every membership entry and log line can hold its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(Arc<str>);

impl RoomId {
    /// Create a room identifier
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Room name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for RoomId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

/// Process-unique identifier of one connected session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_display() {
        let room = RoomId::new("class-42");
        assert_eq!(room.to_string(), "class-42");
        assert_eq!(room.as_str(), "class-42");
    }

    #[test]
    fn test_room_id_conversions_agree() {
        assert_eq!(RoomId::from("r1"), RoomId::from(String::from("r1")));
        assert_ne!(RoomId::from("r1"), RoomId::from("r2"));
    }

    #[test]
    fn test_session_id() {
        let id = SessionId::new(7);
        assert_eq!(id.get(), 7);
        assert_eq!(id.to_string(), "7");
    }
}
