//! Relay sessions
//!
//! A session is one upgraded WebSocket connection bound to one room. The
//! [`SessionLoop`] registers it, relays what the peer sends, and guarantees
//! the session is deregistered however the connection ends.

pub mod context;
pub mod handle;
pub mod runner;
pub mod state;

pub use context::SessionContext;
pub use handle::{Outbound, SessionHandle};
pub use runner::{SessionLoop, SessionOutcome};
pub use state::{CloseReason, SessionPhase, SessionState};
