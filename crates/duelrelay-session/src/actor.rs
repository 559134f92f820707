//! Session actor: one Tokio task that owns the [`Session`].
//!
//! Both peers' connection handlers talk to the same actor through an mpsc
//! channel, so every state transition is applied one at a time, in the
//! order the commands arrive. Nothing outside the task touches the session.

use std::collections::HashMap;

use duelrelay_protocol::Codec;
use duelrelay_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::{Outbox, Router, Session, SessionError, SessionInfo};

/// Commands sent to the session actor through its channel.
///
/// `GetInfo` carries a "reply channel": the caller sends the command and
/// waits for the answer on the oneshot.
enum SessionCommand {
    /// A new connection was accepted. It is registered but not seated.
    Connect { outbox: Outbox },

    /// One raw frame from a registered connection.
    Inbound { conn_id: ConnectionId, data: Vec<u8> },

    /// The connection's socket closed.
    Disconnect { conn_id: ConnectionId },

    /// Request a snapshot of the session metadata.
    GetInfo { reply: oneshot::Sender<SessionInfo> },

    /// Stop the actor.
    Shutdown,
}

/// Handle to the running session actor.
///
/// Cheap to clone; every connection handler holds one.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionCommand>,
}

impl std::fmt::Debug for SessionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect { outbox } => f
                .debug_struct("Connect")
                .field("conn_id", &outbox.connection_id())
                .finish(),
            Self::Inbound { conn_id, data } => f
                .debug_struct("Inbound")
                .field("conn_id", conn_id)
                .field("len", &data.len())
                .finish(),
            Self::Disconnect { conn_id } => {
                f.debug_struct("Disconnect").field("conn_id", conn_id).finish()
            }
            Self::GetInfo { .. } => f.write_str("GetInfo"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl SessionHandle {
    /// Registers a freshly accepted connection with the session.
    pub async fn connect(&self, outbox: Outbox) -> Result<(), SessionError> {
        self.send(SessionCommand::Connect { outbox }).await
    }

    /// Forwards one raw frame from `conn_id` (fire-and-forget).
    pub async fn inbound(
        &self,
        conn_id: ConnectionId,
        data: Vec<u8>,
    ) -> Result<(), SessionError> {
        self.send(SessionCommand::Inbound { conn_id, data }).await
    }

    /// Reports that `conn_id`'s socket closed.
    pub async fn disconnect(&self, conn_id: ConnectionId) -> Result<(), SessionError> {
        self.send(SessionCommand::Disconnect { conn_id }).await
    }

    /// Requests the current session metadata.
    pub async fn info(&self) -> Result<SessionInfo, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| SessionError::Unavailable)
    }

    /// Tells the actor to stop. Queued commands ahead of it still run.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| SessionError::Unavailable)
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct SessionActor<C: Codec> {
    session: Session<C>,
    router: Router<C>,
    /// Every open connection, seated or not.
    connections: HashMap<ConnectionId, Outbox>,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl<C: Codec> SessionActor<C> {
    /// Processes commands until shutdown or until every handle is dropped.
    async fn run(mut self) {
        tracing::info!("session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Connect { outbox } => {
                    let conn_id = outbox.connection_id();
                    self.connections.insert(conn_id, outbox);
                    tracing::debug!(
                        %conn_id,
                        connections = self.connections.len(),
                        "connection registered"
                    );
                }
                SessionCommand::Inbound { conn_id, data } => {
                    self.handle_inbound(conn_id, &data);
                }
                SessionCommand::Disconnect { conn_id } => {
                    self.handle_disconnect(conn_id);
                }
                SessionCommand::GetInfo { reply } => {
                    let _ = reply.send(self.session.info());
                }
                SessionCommand::Shutdown => {
                    tracing::info!("session shutting down");
                    break;
                }
            }
        }

        tracing::info!("session actor stopped");
    }

    fn handle_inbound(&mut self, conn_id: ConnectionId, data: &[u8]) {
        let Some(outbox) = self.connections.get(&conn_id) else {
            tracing::warn!(%conn_id, "frame from unregistered connection, ignoring");
            return;
        };
        let routed = self.router.route(&mut self.session, outbox, data);
        tracing::trace!(%conn_id, ?routed, "frame routed");
    }

    fn handle_disconnect(&mut self, conn_id: ConnectionId) {
        self.connections.remove(&conn_id);
        let seated = self.session.disconnect(conn_id);
        tracing::debug!(
            %conn_id,
            seated,
            connections = self.connections.len(),
            "connection closed"
        );
    }
}

/// Spawns the session actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue; when it fills, handlers wait.
pub fn spawn_session<C: Codec + Clone>(codec: C, channel_size: usize) -> SessionHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = SessionActor {
        session: Session::new(codec.clone()),
        router: Router::new(codec),
        connections: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    SessionHandle { sender: tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Phase;
    use duelrelay_protocol::JsonCodec;

    #[tokio::test]
    async fn test_spawn_session_starts_waiting() {
        let handle = spawn_session(JsonCodec, 16);

        let info = handle.info().await.unwrap();
        assert_eq!(info.phase, Phase::Waiting);
        assert!(info.players.is_empty());
        assert_eq!(info.generation, 0);
    }

    #[tokio::test]
    async fn test_inbound_from_unregistered_connection_is_ignored() {
        let handle = spawn_session(JsonCodec, 16);

        handle
            .inbound(ConnectionId::new(5), br#"{"type":"join","identity":"X"}"#.to_vec())
            .await
            .unwrap();

        assert!(handle.info().await.unwrap().players.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_makes_handle_unavailable() {
        let handle = spawn_session(JsonCodec, 16);
        handle.shutdown().await.unwrap();

        // The actor drops its receiver once the loop exits.
        let err = loop {
            match handle.info().await {
                Err(e) => break e,
                Ok(_) => tokio::task::yield_now().await,
            }
        };
        assert_eq!(err, SessionError::Unavailable);
    }
}
