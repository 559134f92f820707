//! Unified error type for the relay.

use duelrelay_protocol::ProtocolError;
use duelrelay_session::SessionError;
use duelrelay_transport::TransportError;

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so `?`
/// converts layer errors automatically in the server and binary.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (usually the actor being gone).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),
}
