//! Fan-out of one message to a membership snapshot

use futures::future::join_all;
use tokio_tungstenite::tungstenite::Utf8Bytes;

use crate::session::{Outbound, SessionHandle};

use super::key::RoomId;

/// Outcome counts of a single broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Sessions in the snapshot
    pub attempted: usize,
    /// Sessions that accepted the message
    pub delivered: usize,
    /// Sessions whose send failed
    pub failed: usize,
}

impl DeliveryReport {
    /// True when every attempted delivery succeeded (vacuously for empty rooms)
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Deliver `text` to every session in `sessions`
///
/// All sends are polled together so a stalled peer does not hold up the
/// rest. A failed send is logged and counted, nothing more: the session stays
/// registered until its own loop notices the disconnect.
pub(super) async fn fan_out<S: Outbound>(
    room: &RoomId,
    sessions: &[SessionHandle<S>],
    text: Utf8Bytes,
) -> DeliveryReport {
    let attempts = sessions.iter().map(|session| {
        let text = text.clone();
        async move {
            match session.deliver(text).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!(
                        room = %room,
                        session_id = %session.id(),
                        error = %e,
                        "Delivery failed"
                    );
                    false
                }
            }
        }
    });

    let outcomes = join_all(attempts).await;
    let delivered = outcomes.iter().filter(|ok| **ok).count();

    DeliveryReport {
        attempted: outcomes.len(),
        delivered,
        failed: outcomes.len() - delivered,
    }
}
