//! WebSocket relay server
//!
//! Accepts TCP connections, upgrades them at `{route_prefix}/{room}` and runs
//! one session task per connection against a shared room registry.

pub mod config;
pub mod connection;
pub mod listener;
pub mod route;

pub use config::ServerConfig;
pub use connection::{Connection, WsRegistry, WsSink};
pub use listener::RelayServer;
pub use route::ChatRoute;
