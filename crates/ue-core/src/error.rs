//! Error types for uds-echo
//!
//! Binaries wrap these in `anyhow` with context; library callers match on
//! them directly, e.g. to tell a read timeout from a broken connection.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised by a single deadline-governed read or write
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The operation did not complete before its deadline
    #[error("{op} timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },

    /// The operation failed with an I/O error
    #[error("{op} failed: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Fewer bytes were written than requested
    #[error("short write: wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
}

impl ExchangeError {
    /// Whether this error is a deadline expiry rather than a hard failure
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExchangeError::Timeout { .. })
    }

    /// Name of the operation that failed
    pub fn op(&self) -> &'static str {
        match self {
            ExchangeError::Timeout { op, .. } | ExchangeError::Io { op, .. } => op,
            ExchangeError::ShortWrite { .. } => "write",
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
