//! Codec trait and implementations for envelope text.
//!
//! The relay speaks UTF-8 text frames, so a codec encodes to a `String`
//! and decodes from raw frame bytes (a binary frame holding UTF-8 JSON is
//! accepted the same as a text frame).

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that turns envelopes into text and frame bytes back into
/// envelopes.
///
/// `Send + Sync + 'static` because the session actor and every connection
/// task hold one.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a frame back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed, carry an
    /// unknown `type` tag, or don't match the expected shape.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`), the format the browser
/// clients send.
///
/// ## Example
///
/// ```rust
/// use duelrelay_protocol::{ClientMessage, Codec, JsonCodec, MessageKind};
///
/// let codec = JsonCodec;
/// let msg: ClientMessage = codec
///     .decode(br#"{"type":"fire","cellIndex":7}"#)
///     .unwrap();
/// assert_eq!(msg.kind(), MessageKind::Fire);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
