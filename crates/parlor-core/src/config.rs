//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration against a local development server.

use std::time::Duration;

use parlor_shared::constants::DEFAULT_RECONNECT_DELAY_MS;
use parlor_stream::TransportConfig;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the HTTP API server.
    /// Env: `PARLOR_API_URL`
    /// Default: `http://127.0.0.1:8080`
    pub api_base_url: String,

    /// Host:port of the message stream server.
    /// Env: `PARLOR_STREAM_ADDR`
    /// Default: `127.0.0.1:9300`
    pub stream_addr: String,

    /// Fixed delay between stream reconnect attempts.
    /// Env: `PARLOR_RECONNECT_DELAY_MS`
    /// Default: `5000`
    pub reconnect_delay: Duration,

    /// Maximum consecutive failed connect attempts before the transport
    /// gives up (`None` = retry forever).
    /// Env: `PARLOR_MAX_RECONNECT_ATTEMPTS` (0 = unlimited)
    /// Default: unlimited.
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".to_string(),
            stream_addr: "127.0.0.1:9300".to_string(),
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            max_reconnect_attempts: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("PARLOR_API_URL") {
            config.api_base_url = url;
        }

        if let Ok(addr) = std::env::var("PARLOR_STREAM_ADDR") {
            config.stream_addr = addr;
        }

        if let Ok(val) = std::env::var("PARLOR_RECONNECT_DELAY_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                config.reconnect_delay = Duration::from_millis(ms);
            } else {
                tracing::warn!(value = %val, "Invalid PARLOR_RECONNECT_DELAY_MS, using default");
            }
        }

        if let Ok(val) = std::env::var("PARLOR_MAX_RECONNECT_ATTEMPTS") {
            match val.parse::<u32>() {
                Ok(0) => config.max_reconnect_attempts = None,
                Ok(n) => config.max_reconnect_attempts = Some(n),
                Err(_) => {
                    tracing::warn!(
                        value = %val,
                        "Invalid PARLOR_MAX_RECONNECT_ATTEMPTS, using default"
                    );
                }
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    /// The transport slice of the configuration.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            addr: self.stream_addr.clone(),
            reconnect_delay: self.reconnect_delay,
            max_reconnect_attempts: self.max_reconnect_attempts,
        }
    }
}
