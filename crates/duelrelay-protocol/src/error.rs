//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding envelopes.
///
/// A `Decode` error is the normal outcome for a malformed or unknown
/// envelope; callers drop the frame and keep serving the connection.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an envelope into text).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: not JSON, an unknown `type` tag, or a
    /// required field missing or of the wrong type.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
