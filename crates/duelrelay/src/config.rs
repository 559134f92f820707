//! Relay configuration.

use crate::RelayError;

/// Environment variable overriding [`RelayConfig::bind_addr`].
pub const BIND_ENV: &str = "DUELRELAY_BIND";
/// Environment variable overriding [`RelayConfig::channel_size`].
pub const CHANNEL_SIZE_ENV: &str = "DUELRELAY_CHANNEL_SIZE";

/// Settings for a [`RelayServer`](crate::RelayServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    /// Capacity of the session actor's command queue. When it is full,
    /// connection handlers wait before forwarding more frames.
    pub channel_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3001".to_string(),
            channel_size: 64,
        }
    }
}

impl RelayConfig {
    /// Builds a config from the defaults plus `DUELRELAY_*` environment
    /// overrides.
    ///
    /// # Errors
    /// Returns [`RelayError::Config`] if an override cannot be used.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, RelayError> {
        let mut config = Self::default();
        if let Some(addr) = lookup(BIND_ENV) {
            config.bind_addr = addr;
        }
        if let Some(raw) = lookup(CHANNEL_SIZE_ENV) {
            config.channel_size = raw.trim().parse().map_err(|_| {
                RelayError::Config(format!("{CHANNEL_SIZE_ENV}={raw:?} is not a number"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    /// Returns [`RelayError::Config`] for an empty bind address or a zero
    /// channel size.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.bind_addr.trim().is_empty() {
            return Err(RelayError::Config("bind address is empty".into()));
        }
        if self.channel_size == 0 {
            return Err(RelayError::Config(
                "channel size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
