//! Configuration management for uds-echo

mod client;
mod server;
pub mod serde_utils;

pub use client::{ClientConfig, DEFAULT_MESSAGE};
pub use server::{HandlerErrorPolicy, ServerConfig, DEFAULT_REPLY_PREFIX};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Default rendezvous path for the server socket
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/uds-echo.sock";

/// Default receive buffer capacity in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 256;

/// Largest receive buffer accepted; the buffer is allocated per connection
pub const MAX_BUFFER_SIZE: usize = 64 * 1024;

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("uds-echo")
}

/// `<config dir>/uds-echo/config.toml`
fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// On-disk configuration shared by the server and the client
///
/// ```toml
/// socket_path = "/tmp/uds-echo.sock"
///
/// [server]
/// accept_timeout = 1
/// on_handler_error = "continue"
///
/// [client]
/// message = "hello"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Filesystem path of the UNIX domain socket
    pub socket_path: PathBuf,

    /// Server settings
    pub server: ServerConfig,

    /// Client settings
    pub client: ClientConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            server: ServerConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl ConfigFile {
    /// Reject values that would make every exchange fail
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.socket_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("socket_path must not be empty".into()));
        }
        self.server.validate()?;
        self.client.validate()?;
        Ok(())
    }
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load the explicit config file, or the default one if present, or defaults
///
/// An explicit path that cannot be loaded is an error. A broken default file
/// is only warned about so a stray file does not block startup.
pub fn resolve_config(explicit: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let config = match explicit {
        Some(path) => load_config(path)?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                load_config(&default_path).unwrap_or_else(|e| {
                    tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
                    ConfigFile::default()
                })
            } else {
                ConfigFile::default()
            }
        }
    };
    config.validate()?;
    Ok(config)
}

pub(crate) fn require_nonzero(name: &str, value: Duration) -> Result<(), ConfigError> {
    if value.is_zero() {
        return Err(ConfigError::Invalid(format!("{} must be greater than zero", name)));
    }
    Ok(())
}

pub(crate) fn require_buffer_size(name: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_BUFFER_SIZE {
        return Err(ConfigError::Invalid(format!(
            "{} must be between 1 and {} bytes, got {}",
            name, MAX_BUFFER_SIZE, value
        )));
    }
    Ok(())
}
