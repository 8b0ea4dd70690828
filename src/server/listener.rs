//! Relay server listener
//!
//! Handles TCP accept loop and spawns connection handlers.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::registry::SessionId;
use crate::server::config::ServerConfig;
use crate::server::connection::{Connection, WsRegistry};
use crate::server::route::ChatRoute;
use crate::stats::{ServerCounters, ServerStats};

/// Room-scoped WebSocket relay server
pub struct RelayServer {
    config: ServerConfig,
    route: Arc<ChatRoute>,
    registry: Arc<WsRegistry>,
    counters: Arc<ServerCounters>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl RelayServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            route: Arc::new(ChatRoute::new(config.route_prefix.clone())),
            config,
            registry: Arc::new(WsRegistry::new()),
            counters: Arc::new(ServerCounters::new()),
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Get a reference to the room registry
    pub fn registry(&self) -> &Arc<WsRegistry> {
        &self.registry
    }

    /// Get the upgrade route
    pub fn route(&self) -> &ChatRoute {
        &self.route
    }

    /// Connection counters
    pub fn stats(&self) -> ServerStats {
        self.counters.snapshot()
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// Binds the configured address, then serves until the task is dropped.
    /// Accept errors are logged and do not stop the loop.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.log_listening(&listener)?;
        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// Sessions that are already running are not interrupted; they end when
    /// their peers disconnect.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.log_listening(&listener)?;

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    fn log_listening(&self, listener: &TcpListener) -> Result<()> {
        tracing::info!(
            addr = %listener.local_addr()?,
            route = %self.route.prefix(),
            "Relay server listening"
        );
        Ok(())
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    self.counters.connection_rejected();
                    return;
                }
            }
        } else {
            None
        };

        let session_id = SessionId::new(self.next_session_id.fetch_add(1, Ordering::Relaxed));

        tracing::debug!(
            session_id = %session_id,
            peer = %peer_addr,
            "New connection"
        );

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::error!(error = %e, "Failed to configure socket");
                return;
            }
        }

        let connection = Connection::new(
            session_id,
            socket,
            peer_addr,
            self.config.handshake_timeout,
            Arc::clone(&self.route),
            Arc::clone(&self.registry),
            Arc::clone(&self.counters),
        );
        let counters = Arc::clone(&self.counters);
        counters.connection_opened();

        tokio::spawn(async move {
            // Held for the lifetime of the connection
            let _permit = permit;

            match connection.run().await {
                Ok(outcome) => {
                    tracing::debug!(
                        session_id = %session_id,
                        reason = %outcome.reason,
                        "Connection closed"
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = %session_id,
                        error = %e,
                        "Connection error"
                    );
                }
            }

            counters.connection_closed();
        });
    }
}
