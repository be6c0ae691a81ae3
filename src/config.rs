//! Connection configuration.
//!
//! Defaults match the reference deployment: the backend listens on a single
//! well-known loopback port agreed out of band.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default backend host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default backend port.
pub const DEFAULT_PORT: u16 = 15147;

/// Default transport handshake timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a single connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Backend host.
    pub host: String,
    /// Backend port.
    pub port: u16,
    /// How long the transport handshake may take before the connection is
    /// considered failed.
    pub connect_timeout: Duration,
    /// Optional per-call deadline applied to every `send`. `None` means
    /// requests wait indefinitely, matching the reference behavior.
    pub request_timeout: Option<Duration>,
}

impl LinkConfig {
    /// Configuration pointing at the reference endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the backend host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Override the backend port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the handshake timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Apply a per-call deadline to every request on this connection.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// WebSocket URL for this endpoint.
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: None,
        }
    }
}
