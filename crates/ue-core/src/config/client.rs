//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;
use super::{require_buffer_size, require_nonzero, DEFAULT_BUFFER_SIZE};
use crate::error::ConfigError;

/// Message the client sends when none is configured
pub const DEFAULT_MESSAGE: &str = "aaa111223";

/// Configuration for the echo client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Connection timeout
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// Deadline for the write and for the read
    #[serde(with = "duration_secs")]
    pub io_timeout: Duration,

    /// Receive buffer capacity
    pub buffer_size: usize,

    /// Payload sent to the server; must not be empty
    pub message: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            io_timeout: Duration::from_secs(3),
            buffer_size: DEFAULT_BUFFER_SIZE,
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl ClientConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_nonzero("client.connect_timeout", self.connect_timeout)?;
        require_nonzero("client.io_timeout", self.io_timeout)?;
        require_buffer_size("client.buffer_size", self.buffer_size)?;
        // An empty write reaches the server as a client that never sends.
        if self.message.is_empty() {
            return Err(ConfigError::Invalid("client.message must not be empty".into()));
        }
        Ok(())
    }
}
