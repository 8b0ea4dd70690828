//! Statistics and metrics for relay sessions

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::registry::DeliveryReport;

/// Session-level statistics
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Text messages received from the peer
    pub messages_received: u64,
    /// Payload bytes of those messages
    pub bytes_received: u64,
    /// Non-text data frames received and dropped
    pub ignored_frames: u64,
    /// Broadcasts issued on behalf of this session
    pub broadcasts: u64,
    /// Delivery attempts across all those broadcasts
    pub deliveries_attempted: u64,
    /// Delivery attempts that failed
    pub deliveries_failed: u64,
    /// Time spent connected
    pub duration: Duration,
}

impl SessionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one inbound text message
    pub fn record_message(&mut self, len: usize) {
        self.messages_received += 1;
        self.bytes_received += len as u64;
    }

    /// Account for the outcome of one broadcast
    pub fn record_broadcast(&mut self, report: &DeliveryReport) {
        self.broadcasts += 1;
        self.deliveries_attempted += report.attempted as u64;
        self.deliveries_failed += report.failed as u64;
    }
}

/// Registry occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Rooms with at least one member
    pub room_count: usize,
    /// Registered sessions across all rooms
    pub session_count: usize,
}

/// Server-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStats {
    /// Total connections ever accepted
    pub total_connections: u64,
    /// Connections currently being served
    pub active_connections: u64,
    /// Connections dropped by the connection limit
    pub rejected_connections: u64,
    /// Connections that never completed the WebSocket upgrade
    pub failed_handshakes: u64,
}

/// Live counters behind [`ServerStats`]
#[derive(Debug, Default)]
pub struct ServerCounters {
    total_connections: AtomicU64,
    active_connections: AtomicU64,
    rejected_connections: AtomicU64,
    failed_handshakes: AtomicU64,
}

impl ServerCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn connection_rejected(&self) {
        self.rejected_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn handshake_failed(&self) {
        self.failed_handshakes.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> ServerStats {
        ServerStats {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            rejected_connections: self.rejected_connections.load(Ordering::Relaxed),
            failed_handshakes: self.failed_handshakes.load(Ordering::Relaxed),
        }
    }
}
