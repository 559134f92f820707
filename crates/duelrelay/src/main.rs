//! `duelrelay` binary: runs the relay until Ctrl-C.
//!
//! ```text
//! duelrelay [BIND_ADDR]
//! ```
//!
//! Settings come from `DUELRELAY_BIND` / `DUELRELAY_CHANNEL_SIZE`, and a
//! positional bind address wins over the environment. Log verbosity
//! follows `RUST_LOG` (default `info`).

use duelrelay::{RelayConfig, RelayError, RelayServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = RelayConfig::from_env()?;
    if let Some(addr) = std::env::args().nth(1) {
        config.bind_addr = addr;
    }

    let server = RelayServer::builder().config(config).build().await?;
    if let Ok(addr) = server.local_addr() {
        tracing::info!(%addr, "duelrelay listening");
    }

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
}
