//! roomcast server
//!
//! Run with: roomcast [--bind ADDR] [--max-connections N]
//!
//! Clients join a room by opening a WebSocket to `/ws/chat/{room}`:
//!   websocat ws://localhost:8000/ws/chat/lobby

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use roomcast::server::config::{DEFAULT_PORT, DEFAULT_ROUTE_PREFIX};
use roomcast::{RelayServer, ServerConfig};

/// Room-scoped WebSocket text relay
#[derive(Parser, Debug)]
#[command(name = "roomcast", version)]
#[command(about = "Room-scoped WebSocket text relay", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
    bind: SocketAddr,

    /// Maximum concurrent connections (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_connections: usize,

    /// Seconds a client has to complete the WebSocket upgrade
    #[arg(long, default_value_t = 10)]
    handshake_timeout: u64,

    /// Path prefix in front of the room name
    #[arg(long, default_value = DEFAULT_ROUTE_PREFIX)]
    route_prefix: String,

    /// Leave Nagle's algorithm enabled
    #[arg(long)]
    no_tcp_nodelay: bool,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig::with_addr(self.bind)
            .max_connections(self.max_connections)
            .handshake_timeout(Duration::from_secs(self.handshake_timeout))
            .route_prefix(&self.route_prefix)
            .tcp_nodelay(!self.no_tcp_nodelay)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roomcast=info")),
        )
        .init();

    let server = RelayServer::new(args.server_config());

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind = %server.bind_addr(),
        "Starting roomcast"
    );

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    let stats = server.stats();
    tracing::info!(
        total_connections = stats.total_connections,
        active_connections = stats.active_connections,
        "Shut down"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["roomcast"]);
        let config = args.server_config();

        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.max_connections, 0);
        assert_eq!(config.route_prefix, DEFAULT_ROUTE_PREFIX);
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_args_map_to_config() {
        let args = Args::parse_from([
            "roomcast",
            "--bind",
            "127.0.0.1:9001",
            "--max-connections",
            "25",
            "--handshake-timeout",
            "3",
            "--route-prefix",
            "rooms/",
            "--no-tcp-nodelay",
        ]);
        let config = args.server_config();

        assert_eq!(config.bind_addr, "127.0.0.1:9001".parse().unwrap());
        assert_eq!(config.max_connections, 25);
        assert_eq!(config.handshake_timeout, Duration::from_secs(3));
        assert_eq!(config.route_prefix, "/rooms");
        assert!(!config.tcp_nodelay);
    }
}
