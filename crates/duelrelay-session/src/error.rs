//! Error types for the session layer.

use duelrelay_protocol::MessageKind;
use duelrelay_transport::ConnectionId;

use crate::Phase;

/// Reasons a session operation was refused.
///
/// None of these are fatal. The router answers [`NotYourTurn`] on the
/// wire and silently drops everything else.
///
/// [`NotYourTurn`]: SessionError::NotYourTurn
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The connection does not hold a slot in the current generation.
    #[error("connection {0} is not seated in this session")]
    UnknownConnection(ConnectionId),

    /// A turn-gated kind came from someone other than the turn holder,
    /// or arrived while no battle is in progress. The text is what the
    /// client sees.
    #[error("Not your turn")]
    NotYourTurn,

    /// The kind is not accepted in the session's current phase.
    #[error("{kind} not accepted while session is {phase}")]
    InvalidPhase { kind: MessageKind, phase: Phase },

    /// The session actor's command channel is closed.
    #[error("session is unavailable")]
    Unavailable,
}
