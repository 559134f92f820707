//! # Duelrelay
//!
//! WebSocket relay for two-player, turn-based browser games.
//!
//! The relay seats two clients in a single session, waits for both to
//! commit their private state, then forwards moves between them while
//! enforcing whose turn it is. It never sees or validates game state; it
//! only routes envelopes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use duelrelay::prelude::*;
//!
//! # async fn run() -> Result<(), RelayError> {
//! let server = RelayServer::builder()
//!     .bind("0.0.0.0:3001")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::RelayConfig;
pub use error::RelayError;
pub use server::{RelayServer, RelayServerBuilder};

/// Everything an embedder or test usually needs.
pub mod prelude {
    pub use crate::{RelayConfig, RelayError, RelayServer, RelayServerBuilder};
    pub use duelrelay_protocol::{
        ClientMessage, Codec, Identity, JsonCodec, MessageKind, PlayerNum,
        ProtocolError, ServerMessage,
    };
    pub use duelrelay_session::{Phase, SessionError, SessionHandle, SessionInfo};
    pub use duelrelay_transport::{ConnectionId, TransportError};
}
