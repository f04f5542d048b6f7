//! Server configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;
use super::{require_buffer_size, require_nonzero, DEFAULT_BUFFER_SIZE};
use crate::error::ConfigError;

/// Prefix prepended to every echoed message
pub const DEFAULT_REPLY_PREFIX: &str = "ok, ";

/// What the accept loop does after a connection handler fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerErrorPolicy {
    /// Stop serving and report the error
    #[default]
    Exit,
    /// Log the failure and keep accepting
    Continue,
}

impl std::str::FromStr for HandlerErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exit" => Ok(Self::Exit),
            "continue" => Ok(Self::Continue),
            other => Err(format!(
                "unknown handler error policy '{}' (expected 'exit' or 'continue')",
                other
            )),
        }
    }
}

/// Configuration for the echo server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// How long one accept attempt waits before the shutdown token is rechecked
    #[serde(with = "duration_secs")]
    pub accept_timeout: Duration,

    /// Deadline for the read and for the write on an accepted connection
    #[serde(with = "duration_secs")]
    pub io_timeout: Duration,

    /// Receive buffer capacity; longer messages are truncated
    pub buffer_size: usize,

    /// Bytes prepended to the echoed message
    pub reply_prefix: String,

    /// Policy applied when a connection handler fails
    pub on_handler_error: HandlerErrorPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            accept_timeout: Duration::from_secs(1),
            io_timeout: Duration::from_secs(3),
            buffer_size: DEFAULT_BUFFER_SIZE,
            reply_prefix: DEFAULT_REPLY_PREFIX.to_string(),
            on_handler_error: HandlerErrorPolicy::Exit,
        }
    }
}

impl ServerConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_nonzero("server.accept_timeout", self.accept_timeout)?;
        require_nonzero("server.io_timeout", self.io_timeout)?;
        require_buffer_size("server.buffer_size", self.buffer_size)
    }
}
