//! Per-connection echo handler

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite};

use ue_core::config::ServerConfig;
use ue_core::deadline::{read_once, write_once};
use ue_core::ExchangeError;

/// How a connection ended when no error occurred
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// A message was received and the reply was written in full
    Echoed { received: usize, sent: usize },
    /// The peer closed its end without sending anything
    PeerClosed,
}

/// Compose the reply for a received message
///
/// The message is appended as-is; it is neither trimmed nor checked for
/// valid UTF-8.
pub fn build_reply(prefix: &str, message: &[u8]) -> Bytes {
    let mut reply = BytesMut::with_capacity(prefix.len() + message.len());
    reply.put_slice(prefix.as_bytes());
    reply.put_slice(message);
    reply.freeze()
}

/// Serve one connection: one read, then one write
///
/// The stream is owned by the handler and dropped on every return path,
/// which closes the connection.
pub async fn handle_connection<S>(
    mut stream: S,
    config: &ServerConfig,
) -> Result<HandleOutcome, ExchangeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let received = read_once(&mut stream, config.buffer_size, config.io_timeout)
        .await
        .map_err(|e| {
            tracing::warn!("call read fail [{}]", e);
            e
        })?;

    if received.is_empty() {
        tracing::info!("client connection close");
        return Ok(HandleOutcome::PeerClosed);
    }
    tracing::info!(
        "recv [{}][{}]",
        received.len(),
        String::from_utf8_lossy(&received)
    );

    let reply = build_reply(&config.reply_prefix, &received);
    tracing::info!("send [{}][{}]", reply.len(), String::from_utf8_lossy(&reply));

    let sent = write_once(&mut stream, &reply, config.io_timeout)
        .await
        .map_err(|e| {
            tracing::warn!("call write fail [{}]", e);
            e
        })?;

    Ok(HandleOutcome::Echoed {
        received: received.len(),
        sent,
    })
}
