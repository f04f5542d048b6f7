//! Accept loop
//!
//! Connections are accepted one at a time and handled inline. Each accept
//! attempt is bounded by `accept_timeout`; an expired attempt just loops so
//! the shutdown token is rechecked between attempts.

use std::path::Path;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use ue_core::config::{HandlerErrorPolicy, ServerConfig};
use ue_core::{describe_addr, SocketListener};

use crate::handler::{handle_connection, HandleOutcome};

/// Counters collected over the lifetime of one accept loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeReport {
    /// Connections accepted
    pub accepted: u64,
    /// Connections that received a full reply
    pub echoed: u64,
    /// Connections closed by the peer before sending
    pub peer_closed: u64,
    /// Connections whose handler failed
    pub failed: u64,
}

/// Echo server bound to a shutdown token
pub struct EchoServer {
    config: ServerConfig,
    shutdown: CancellationToken,
}

impl EchoServer {
    /// Create a new server
    pub fn new(config: ServerConfig, shutdown: CancellationToken) -> Self {
        Self { config, shutdown }
    }

    /// Bind `path` and serve until shutdown
    ///
    /// The socket file is removed when this returns, on success or error.
    pub async fn run(&self, path: &Path) -> Result<ServeReport> {
        let listener = SocketListener::bind(path)
            .await
            .with_context(|| format!("Failed to bind unix socket at {}", path.display()))?;

        tracing::info!("Echo server listening on {}", path.display());

        self.serve(&listener).await
    }

    /// Serve connections from an already bound listener until shutdown
    pub async fn serve(&self, listener: &SocketListener) -> Result<ServeReport> {
        let mut report = ServeReport::default();

        while !self.shutdown.is_cancelled() {
            let accepted = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                result = tokio::time::timeout(self.config.accept_timeout, listener.accept()) => result,
            };

            let (stream, peer_addr) = match accepted {
                Err(_) => {
                    tracing::trace!("accept timed out, polling shutdown");
                    continue;
                }
                Ok(Err(e)) => {
                    tracing::error!("call accept fail [{}]", e);
                    return Err(e).context("Failed to accept connection");
                }
                Ok(Ok(pair)) => pair,
            };

            report.accepted += 1;
            tracing::info!("accept [unix][{}]", describe_addr(&peer_addr));

            match handle_connection(stream, &self.config).await {
                Ok(HandleOutcome::Echoed { .. }) => report.echoed += 1,
                Ok(HandleOutcome::PeerClosed) => report.peer_closed += 1,
                Err(e) => {
                    report.failed += 1;
                    match self.config.on_handler_error {
                        HandlerErrorPolicy::Exit => {
                            tracing::error!("connection handler fail [{}], stopping", e);
                            return Err(anyhow::Error::new(e).context("Connection handler failed"));
                        }
                        HandlerErrorPolicy::Continue => {
                            tracing::warn!("connection handler fail [{}], continuing", e);
                        }
                    }
                }
            }
        }

        tracing::info!(
            accepted = report.accepted,
            echoed = report.echoed,
            peer_closed = report.peer_closed,
            failed = report.failed,
            "Accept loop stopped"
        );
        Ok(report)
    }
}
