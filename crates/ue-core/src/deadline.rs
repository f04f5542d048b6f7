//! Deadline-governed stream I/O
//!
//! Every blocking step of an exchange is bounded by a deadline. Expiry is
//! reported as [`ExchangeError::Timeout`] so callers can tell it apart from
//! hard I/O failures.

use std::future::Future;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ExchangeError;

/// Run `fut` with a deadline of `limit` from now
pub async fn with_deadline<F, T>(
    op: &'static str,
    limit: Duration,
    fut: F,
) -> Result<T, ExchangeError>
where
    F: Future<Output = std::io::Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(ExchangeError::Io { op, source }),
        Err(_) => Err(ExchangeError::Timeout { op, after: limit }),
    }
}

/// Perform exactly one read of at most `capacity` bytes
///
/// An empty result means the peer closed its end before sending anything.
pub async fn read_once<S>(
    stream: &mut S,
    capacity: usize,
    limit: Duration,
) -> Result<Bytes, ExchangeError>
where
    S: AsyncRead + Unpin,
{
    let mut buf = BytesMut::zeroed(capacity);
    let n = with_deadline("read", limit, stream.read(&mut buf[..])).await?;
    buf.truncate(n);
    Ok(buf.freeze())
}

/// Perform exactly one write of `data` and require all of it to be accepted
pub async fn write_once<S>(
    stream: &mut S,
    data: &[u8],
    limit: Duration,
) -> Result<usize, ExchangeError>
where
    S: AsyncWrite + Unpin,
{
    let written = with_deadline("write", limit, async {
        let n = stream.write(data).await?;
        stream.flush().await?;
        Ok::<_, std::io::Error>(n)
    })
    .await?;

    if written != data.len() {
        return Err(ExchangeError::ShortWrite {
            written,
            expected: data.len(),
        });
    }
    Ok(written)
}
