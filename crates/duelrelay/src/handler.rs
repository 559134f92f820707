//! Per-connection handler.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbox with the session actor
//!   2. Loop: forward inbound frames to the actor, and write whatever the
//!      actor pushes into the outbox back to the socket
//!   3. On close, tell the actor the connection is gone

use std::sync::Arc;

use duelrelay_session::{Outbox, SessionHandle};
use duelrelay_transport::{Connection, ConnectionId, WebSocketConnection};

use crate::RelayError;
use crate::server::ServerState;

/// Drop guard that reports the connection closed when the handler exits.
///
/// This ensures cleanup happens even if the handler returns early with an
/// error. Since `Drop` is synchronous, we spawn a fire-and-forget task for
/// the async send.
struct ConnectionGuard {
    conn_id: ConnectionId,
    session: SessionHandle,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let session = self.session.clone();
        tokio::spawn(async move {
            let _ = session.disconnect(conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), RelayError> {
    let conn_id = conn.id();
    tracing::info!(%conn_id, peer = %conn.peer_addr(), "client connected");

    let (outbox, mut outbox_rx) = Outbox::channel(conn_id);
    state.session.connect(outbox).await?;
    let _guard = ConnectionGuard {
        conn_id,
        session: state.session.clone(),
    };

    let result = loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(data)) => {
                    if let Err(e) = state.session.inbound(conn_id, data).await {
                        break Err(e.into());
                    }
                }
                Ok(None) => {
                    tracing::info!(%conn_id, "client disconnected");
                    break Ok(());
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "recv error");
                    break Ok(());
                }
            },
            Some(frame) = outbox_rx.recv() => {
                if let Err(e) = conn.send_text(&frame).await {
                    tracing::debug!(%conn_id, error = %e, "send error");
                    break Ok(());
                }
            }
        }
    };

    let _ = conn.close().await;
    // _guard drops here → the session hears about the disconnect.
    result
}
