//! Crate-level error type
//!
//! Errors that can end a connection or stop the server. Per-message failures
//! (a single delivery, a single read) never surface here; they are handled
//! where they occur.

use std::time::Duration;

use tokio_tungstenite::tungstenite;

/// Error type for server and connection operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Socket-level failure (bind, accept, socket options)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket handshake or protocol failure
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Client did not complete the upgrade in time
    #[error("WebSocket handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    /// Upgrade completed without a room being routed
    #[error("upgrade request did not name a chat room")]
    UnknownRoute,
}

/// Result alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;
