//! The two-participant session relay.
//!
//! This crate holds everything with real protocol responsibility:
//!
//! 1. **Session** ([`Session`], [`Phase`]): the two-slot match state,
//!    who joined, who is ready, whose turn it is.
//! 2. **Router** ([`Router`]): decodes a frame once, checks the kind's
//!    preconditions, and calls the matching session operation.
//! 3. **Delivery** ([`Outbox`], [`Delivery`]): fire-and-forget writes to
//!    one or all participants, skipping connections that are gone.
//! 4. **Actor** ([`spawn_session`], [`SessionHandle`]): one task that owns
//!    the session, so messages from both peers are applied one at a time.
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)  ← one handler task per connection, forwards frames
//!     ↕
//! Session actor (this crate)  ← serializes every state transition
//!     ↕
//! Protocol + Transport (below)  ← envelopes, ConnectionId
//! ```

mod actor;
mod delivery;
mod error;
mod phase;
mod router;
mod session;

pub use actor::{SessionHandle, spawn_session};
pub use delivery::{Delivery, Outbox, OutboxReceiver};
pub use error::SessionError;
pub use phase::Phase;
pub use router::{Routed, Router};
pub use session::{Participant, Resolution, Session, SessionInfo};
