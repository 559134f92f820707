//! Wire protocol for duelrelay.
//!
//! This crate defines the envelopes that travel between the relay and its
//! two clients:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`MessageKind`]):
//!   one closed tagged enum per direction, decoded once at the boundary.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how envelopes are
//!   converted to and from UTF-8 text.
//! - **Errors** ([`ProtocolError`]): what can go wrong while encoding or
//!   decoding.
//!
//! The protocol layer does not know about connections or sessions. Game
//! payloads such as proofs or card actions are carried as opaque JSON and
//! never interpreted here.
//!
//! ```text
//! Transport (text) → Protocol (ClientMessage) → Session (two slots)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ClientMessage, Identity, MessageKind, PlayerNum, ServerMessage,
    NOT_YOUR_TURN,
};
