//! `RelayServer` builder and accept loop.
//!
//! This is the entry point for running the relay. It ties the layers
//! together: transport → handler → session actor.

use std::future::Future;
use std::sync::Arc;

use duelrelay_protocol::JsonCodec;
use duelrelay_session::{SessionHandle, spawn_session};
use duelrelay_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{RelayConfig, RelayError};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) session: SessionHandle,
}

/// Builder for configuring and starting a relay.
///
/// # Example
///
/// ```rust,no_run
/// use duelrelay::prelude::*;
///
/// # async fn run() -> Result<(), RelayError> {
/// let server = RelayServer::builder()
///     .bind("127.0.0.1:3001")
///     .channel_size(128)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct RelayServerBuilder {
    config: RelayConfig,
}

impl RelayServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: RelayConfig::default(),
        }
    }

    /// Replaces every setting with `config`.
    pub fn config(mut self, config: RelayConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the capacity of the session actor's command queue.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.config.channel_size = size;
        self
    }

    /// Binds the listener and spawns the session actor.
    ///
    /// Must be called inside a Tokio runtime.
    pub async fn build(self) -> Result<RelayServer, RelayError> {
        self.config.validate()?;
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let session = spawn_session(JsonCodec, self.config.channel_size);

        tracing::info!(
            addr = %self.config.bind_addr,
            channel_size = self.config.channel_size,
            "relay bound"
        );

        Ok(RelayServer {
            transport,
            state: Arc::new(ServerState { session }),
        })
    }
}

impl Default for RelayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound relay, ready to accept connections.
///
/// Call [`run()`](Self::run) to start accepting.
pub struct RelayServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl RelayServer {
    /// Creates a new builder.
    pub fn builder() -> RelayServerBuilder {
        RelayServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle to the session actor, for inspection.
    pub fn session(&self) -> SessionHandle {
        self.state.session.clone()
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// A failed handshake or accept is logged and the loop keeps going.
    pub async fn run(self) -> Result<(), RelayError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes, then stops the
    /// session actor.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), RelayError> {
        tracing::info!("relay running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                    }
                },
                () = &mut shutdown => {
                    tracing::info!("relay shutting down");
                    break;
                }
            }
        }

        self.state.session.shutdown().await?;
        Ok(())
    }
}
