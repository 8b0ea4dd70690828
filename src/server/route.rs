//! Upgrade path routing
//!
//! Maps the request path of a WebSocket upgrade to a room:
//! `{prefix}/{room}`, where the room segment is percent-decoded.

use tokio_tungstenite::tungstenite::handshake::server::ErrorResponse;
use tokio_tungstenite::tungstenite::http::StatusCode;

use crate::registry::RoomId;

/// Route for chat room upgrades
#[derive(Debug, Clone)]
pub struct ChatRoute {
    prefix: String,
}

impl ChatRoute {
    /// Create a route under `prefix` (already normalized, see
    /// [`ServerConfig::route_prefix`](super::ServerConfig::route_prefix))
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Room addressed by a request path, if any
    ///
    /// The room segment must be present, non-empty, a single path segment
    /// and valid UTF-8 once decoded.
    pub fn room_for_path(&self, path: &str) -> Option<RoomId> {
        let segment = path.strip_prefix(self.prefix.as_str())?.strip_prefix('/')?;
        if segment.is_empty() || segment.contains('/') {
            return None;
        }

        let name = urlencoding::decode(segment).ok()?;
        if name.is_empty() {
            return None;
        }
        Some(RoomId::new(name))
    }

    /// Request path for a room
    pub fn path_for(&self, room: &RoomId) -> String {
        format!("{}/{}", self.prefix, urlencoding::encode(room.as_str()))
    }
}

/// Handshake rejection for paths that do not name a room
pub(crate) fn not_found(path: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(format!("no chat room at {path}")));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}
