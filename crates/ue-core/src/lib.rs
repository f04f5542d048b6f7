//! ue-core: Shared building blocks for uds-echo
//!
//! This crate provides the configuration, error types, deadline-governed
//! stream I/O, socket listener and shutdown signal handling used by both
//! the echo server and the client.

pub mod config;
pub mod deadline;
pub mod error;
#[cfg(unix)]
pub mod listener;
#[cfg(unix)]
pub mod signal;

pub use error::{ConfigError, ExchangeError};
#[cfg(unix)]
pub use listener::{describe_addr, SocketListener};
