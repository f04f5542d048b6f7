//! Echo client
//!
//! The exchange is the mirror image of the server's: one write, then one
//! read, each under its own deadline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixStream;
use tokio_util::sync::CancellationToken;

use ue_core::config::ClientConfig;
use ue_core::deadline::{read_once, with_deadline, write_once};
use ue_core::{describe_addr, ExchangeError};

/// Result of one send/receive exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// The server answered
    Reply { sent: usize, reply: Bytes },
    /// The server closed the connection without answering
    PeerClosed { sent: usize },
}

impl Exchange {
    /// Reply payload, if any
    pub fn reply(&self) -> Option<&Bytes> {
        match self {
            Exchange::Reply { reply, .. } => Some(reply),
            Exchange::PeerClosed { .. } => None,
        }
    }
}

/// Write `message` once, then read one reply of at most `buffer_size` bytes
pub async fn send_and_receive<S>(
    stream: &mut S,
    message: &[u8],
    config: &ClientConfig,
) -> Result<Exchange, ExchangeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    tracing::info!("send [{}][{}]", message.len(), String::from_utf8_lossy(message));
    let sent = write_once(stream, message, config.io_timeout)
        .await
        .map_err(|e| {
            tracing::warn!("call write fail [{}]", e);
            e
        })?;

    let reply = read_once(stream, config.buffer_size, config.io_timeout)
        .await
        .map_err(|e| {
            tracing::warn!("call read fail [{}]", e);
            e
        })?;

    if reply.is_empty() {
        tracing::info!("server connection close");
        return Ok(Exchange::PeerClosed { sent });
    }

    Ok(Exchange::Reply { sent, reply })
}

/// Client for a single echo exchange
pub struct EchoClient {
    path: PathBuf,
    config: ClientConfig,
}

impl EchoClient {
    /// Create a new client for the socket at `path`
    pub fn new(path: impl Into<PathBuf>, config: ClientConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Connect within the configured connect timeout
    pub async fn connect(&self) -> Result<UnixStream> {
        tracing::debug!("Connecting to echo server at {}", self.path.display());

        let stream = with_deadline(
            "connect",
            self.config.connect_timeout,
            UnixStream::connect(&self.path),
        )
        .await
        .with_context(|| {
            format!(
                "Failed to connect to echo server at {}. Is it running?",
                self.path.display()
            )
        })?;

        let peer = stream.peer_addr().context("Failed to read peer address")?;
        tracing::info!("connect [unix][{}]", describe_addr(&peer));
        Ok(stream)
    }

    /// Connect, send the configured message and read the reply
    ///
    /// Shutdown is only checked before the exchange starts; an exchange in
    /// progress is bounded by its deadlines instead.
    pub async fn run(&self, shutdown: &CancellationToken) -> Result<Exchange> {
        let mut stream = self.connect().await?;

        if shutdown.is_cancelled() {
            anyhow::bail!("Shutdown requested before the exchange started");
        }

        let exchange = send_and_receive(&mut stream, self.config.message.as_bytes(), &self.config)
            .await
            .context("Echo exchange failed")?;
        Ok(exchange)
    }
}
