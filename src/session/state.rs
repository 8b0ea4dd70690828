//! Session state machine
//!
//! Tracks a relay session from upgrade to disconnection:
//! `Connecting -> Active -> Closed`.

use std::fmt;
use std::time::{Duration, Instant};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Upgraded, not yet a room member
    Connecting,
    /// Registered in its room, relaying messages
    Active,
    /// Deregistered; terminal
    Closed,
}

/// Why a session left the `Active` phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Peer sent a close frame
    PeerClosed,
    /// Inbound stream ended without a close frame
    StreamEnded,
    /// Reading from the peer failed
    ReadError,
    /// The registry refused the session
    RegisterFailed,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CloseReason::PeerClosed => "peer closed",
            CloseReason::StreamEnded => "stream ended",
            CloseReason::ReadError => "read error",
            CloseReason::RegisterFailed => "register failed",
        };
        f.write_str(s)
    }
}

/// Complete session state
#[derive(Debug)]
pub struct SessionState {
    /// Current phase
    pub phase: SessionPhase,

    /// When the upgrade completed
    pub connected_at: Instant,

    /// When the session joined its room
    pub activated_at: Option<Instant>,

    /// When the session closed
    pub closed_at: Option<Instant>,

    /// Set once, on the transition to `Closed`
    pub close_reason: Option<CloseReason>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Connecting,
            connected_at: Instant::now(),
            activated_at: None,
            closed_at: None,
            close_reason: None,
        }
    }

    /// Enter `Active` after registration
    pub fn activate(&mut self) {
        if self.phase == SessionPhase::Connecting {
            self.phase = SessionPhase::Active;
            self.activated_at = Some(Instant::now());
        }
    }

    /// Enter `Closed`
    ///
    /// Returns false if the session was already closed; the first reason wins.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        if self.phase == SessionPhase::Closed {
            return false;
        }
        self.phase = SessionPhase::Closed;
        self.closed_at = Some(Instant::now());
        self.close_reason = Some(reason);
        true
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// Time connected, up to now or to the close
    pub fn duration(&self) -> Duration {
        match self.closed_at {
            Some(closed_at) => closed_at.duration_since(self.connected_at),
            None => self.connected_at.elapsed(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let mut state = SessionState::new();
        assert_eq!(state.phase, SessionPhase::Connecting);
        assert!(!state.is_active());

        state.activate();
        assert_eq!(state.phase, SessionPhase::Active);
        assert!(state.is_active());
        assert!(state.activated_at.is_some());

        assert!(state.close(CloseReason::PeerClosed));
        assert_eq!(state.phase, SessionPhase::Closed);
        assert_eq!(state.close_reason, Some(CloseReason::PeerClosed));
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut state = SessionState::new();
        state.activate();
        state.close(CloseReason::ReadError);

        assert!(!state.close(CloseReason::PeerClosed));
        assert_eq!(state.close_reason, Some(CloseReason::ReadError));

        state.activate();
        assert_eq!(state.phase, SessionPhase::Closed);
    }

    #[test]
    fn test_close_without_activation() {
        let mut state = SessionState::new();
        assert!(state.close(CloseReason::RegisterFailed));
        assert!(state.activated_at.is_none());
        assert_eq!(state.phase, SessionPhase::Closed);
    }

    #[test]
    fn test_duration_frozen_after_close() {
        let mut state = SessionState::new();
        state.close(CloseReason::StreamEnded);
        let first = state.duration();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(state.duration(), first);
    }
}
