//! Inbound frame routing.
//!
//! The router is the only place that looks at raw client bytes. It decodes
//! a frame once, picks the session operation for its kind, and turns the
//! operation's outcome into a [`Routed`] value. The only refusal a client
//! ever hears about is "Not your turn"; everything else is logged and
//! dropped.

use duelrelay_protocol::{
    ClientMessage, Codec, JsonCodec, MessageKind, ServerMessage,
};

use crate::{Outbox, Resolution, Session, SessionError};

/// What became of one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// The session operation ran.
    Dispatched(MessageKind),
    /// The operation was refused; the caller may have been told why.
    Rejected(MessageKind),
    /// The frame could not be decoded.
    Dropped,
}

/// Decodes inbound frames and applies them to a [`Session`].
#[derive(Debug, Clone)]
pub struct Router<C: Codec = JsonCodec> {
    codec: C,
}

impl Default for Router<JsonCodec> {
    fn default() -> Self {
        Self::new(JsonCodec)
    }
}

impl<C: Codec> Router<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// Routes one frame from `caller` into `session`.
    ///
    /// | kind             | gate                           |
    /// |------------------|--------------------------------|
    /// | `join`           | none                           |
    /// | `board_committed`| caller seated                  |
    /// | `fire`           | caller holds the turn          |
    /// | `shot_result`    | caller seated, battle running  |
    /// | `game_over`      | caller seated                  |
    /// | `tcg_action`     | caller seated                  |
    /// | `pass_turn`      | caller holds the turn          |
    ///
    /// Only `fire` from a connection without a slot is answered; every
    /// other stranger is ignored.
    pub fn route<D: Codec>(
        &self,
        session: &mut Session<D>,
        caller: &Outbox,
        data: &[u8],
    ) -> Routed {
        let conn_id = caller.connection_id();
        let msg: ClientMessage = match self.codec.decode(data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "dropping undecodable frame");
                return Routed::Dropped;
            }
        };
        let kind = msg.kind();

        let result = match msg {
            ClientMessage::Join { identity } => {
                session.join(caller, identity);
                Ok(())
            }
            ClientMessage::BoardCommitted {} => session.mark_ready(conn_id),
            ClientMessage::Fire { cell_index } => session.act(conn_id, cell_index),
            ClientMessage::ShotResult {
                cell_index,
                hit,
                proof,
            } => session.resolve(
                conn_id,
                Resolution::Shot {
                    cell_index,
                    hit,
                    proof,
                },
            ),
            ClientMessage::PassTurn {} => session.resolve(conn_id, Resolution::Pass),
            ClientMessage::TcgAction { action, payload } => {
                session.relay(conn_id, action, payload)
            }
            ClientMessage::GameOver {} => session.declare_winner(conn_id),
        };

        match result {
            Ok(()) => Routed::Dispatched(kind),
            Err(SessionError::NotYourTurn) => {
                tracing::debug!(%conn_id, %kind, "rejected out of turn");
                session
                    .delivery()
                    .send_to(caller, &ServerMessage::not_your_turn());
                Routed::Rejected(kind)
            }
            Err(e) => {
                tracing::debug!(%conn_id, %kind, error = %e, "ignoring message");
                Routed::Rejected(kind)
            }
        }
    }
}
