//! Room registry for message fan-out
//!
//! The registry tracks which sessions are connected to which room and relays
//! each inbound message to every member of the sender's room.
//!
//! # Architecture
//!
//! ```text
//!                       Arc<RoomRegistry>
//!                 ┌──────────────────────────┐
//!                 │ Mutex<                   │
//!                 │   entries: RoomId ->     │
//!                 │     RoomEntry [handles]  │
//!                 │   index: SessionId ->    │
//!                 │     RoomId               │
//!                 │ >                        │
//!                 └────────────┬─────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//!   [Session A]           [Session B]           [Session C]
//!   inbound.next()        inbound.next()        inbound.next()
//!        │
//!        └──► registry.broadcast() ──► snapshot ──► deliver() ──► WebSocket
//! ```
//!
//! # Lock Scope
//!
//! The lock covers membership updates and the snapshot copy. Delivery runs
//! on the copy after the lock is released, so a slow peer never blocks joins,
//! leaves or broadcasts elsewhere. Payloads are `Utf8Bytes`, which are
//! reference-counted: each recipient gets a cheap clone, not a copy.

pub mod delivery;
pub mod entry;
pub mod error;
pub mod key;
pub mod store;

pub use delivery::DeliveryReport;
pub use entry::RoomEntry;
pub use error::{DeliveryError, RegistryError};
pub use key::{RoomId, SessionId};
pub use store::RoomRegistry;
