//! Room-scoped WebSocket text relay
//!
//! Clients connect to `ws://host/ws/chat/{room}`; every text message a client
//! sends is relayed to every client connected to the same room, the sender
//! included. Rooms exist while they have members.
//!
//! # Example
//! ```no_run
//! use roomcast::{RelayServer, ServerConfig};
//!
//! # async fn example() -> roomcast::Result<()> {
//! let config = ServerConfig::default().max_connections(1000);
//! let server = RelayServer::new(config);
//!
//! server
//!     .run_until(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

pub use error::{Error, Result};
pub use registry::{DeliveryReport, RoomId, RoomRegistry, SessionId};
pub use server::{RelayServer, ServerConfig};
pub use session::{SessionLoop, SessionOutcome};
