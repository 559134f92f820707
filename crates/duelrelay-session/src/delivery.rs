//! Fire-and-forget delivery to connected clients.
//!
//! The session never writes to a socket directly. Each connection's handler
//! task owns the socket and drains an [`Outbox`] channel into it; the
//! session pushes encoded frames into that channel. Once the handler is
//! gone the channel is closed and pushes become no-ops.

use duelrelay_protocol::{Codec, ServerMessage};
use duelrelay_transport::ConnectionId;
use tokio::sync::mpsc;

/// Receiving end of an [`Outbox`], drained by the connection's handler.
pub type OutboxReceiver = mpsc::UnboundedReceiver<String>;

/// Handle for pushing encoded frames to one client connection.
///
/// Cheap to clone. The session keeps one inside each participant.
#[derive(Debug, Clone)]
pub struct Outbox {
    conn_id: ConnectionId,
    tx: mpsc::UnboundedSender<String>,
}

impl Outbox {
    /// Creates an outbox for `conn_id` and the receiver its handler drains.
    pub fn channel(conn_id: ConnectionId) -> (Self, OutboxReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { conn_id, tx }, rx)
    }

    /// Returns the connection this outbox writes to.
    pub fn connection_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Returns `true` while the connection's handler is still draining.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn push(&self, frame: String) {
        // A closed receiver means the client is gone; nothing to report.
        let _ = self.tx.send(frame);
    }
}

/// Encodes envelopes and writes them to outboxes.
///
/// Writes are at-most-once: an encode failure is logged, a closed
/// connection is skipped, and nothing is retried.
#[derive(Debug, Clone, Default)]
pub struct Delivery<C: Codec> {
    codec: C,
}

impl<C: Codec> Delivery<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// Sends `msg` to one connection if it is still open.
    pub fn send_to(&self, outbox: &Outbox, msg: &ServerMessage) {
        if !outbox.is_open() {
            return;
        }
        if let Some(frame) = self.encode(msg) {
            outbox.push(frame);
        }
    }

    /// Sends `msg` to every open outbox in `targets` except `excluded`,
    /// encoding it once.
    pub fn broadcast_except<'a>(
        &self,
        targets: impl IntoIterator<Item = &'a Outbox>,
        msg: &ServerMessage,
        excluded: ConnectionId,
    ) {
        let mut frame: Option<String> = None;
        for outbox in targets {
            if outbox.connection_id() == excluded || !outbox.is_open() {
                continue;
            }
            if frame.is_none() {
                frame = self.encode(msg);
            }
            match &frame {
                Some(text) => outbox.push(text.clone()),
                None => return,
            }
        }
    }

    fn encode(&self, msg: &ServerMessage) -> Option<String> {
        match self.codec.encode(msg) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode outbound envelope");
                None
            }
        }
    }
}
