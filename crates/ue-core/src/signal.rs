//! Termination signal handling
//!
//! OS signals are forwarded into a small bounded queue and consumed by a
//! long-lived handler task. SIGINT, SIGQUIT and SIGTERM cancel the shared
//! shutdown token; the handler keeps running afterwards so repeated signals
//! are still logged.

use std::io;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Capacity of the queue between the OS-facing forwarders and the handler
pub const SIGNAL_QUEUE_CAPACITY: usize = 4;

/// Ignore SIGPIPE so writes to a closed peer surface as `EPIPE` errors
pub fn ignore_sigpipe() {
    // SAFETY: installing SIG_IGN has no handler code to race with and is
    // done before any socket is written to.
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }
}

/// Whether `signum` requests a graceful shutdown
pub fn is_shutdown_signal(signum: i32) -> bool {
    matches!(signum, libc::SIGINT | libc::SIGQUIT | libc::SIGTERM)
}

/// Spawn the task that turns queued signal numbers into a shutdown request
pub fn spawn_signal_handler(
    mut queue: mpsc::Receiver<i32>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(signum) = queue.recv().await {
            tracing::info!("signal {}", signum);

            if is_shutdown_signal(signum) {
                if !shutdown.is_cancelled() {
                    tracing::info!("Shutdown requested");
                }
                shutdown.cancel();
            } else {
                tracing::warn!("Ignoring unexpected signal {}", signum);
            }
        }
    })
}

/// Register for SIGINT, SIGQUIT and SIGTERM and spawn the handler task
///
/// Must be called from within a tokio runtime.
pub fn spawn_signal_listener(shutdown: CancellationToken) -> io::Result<JoinHandle<()>> {
    let (tx, rx) = mpsc::channel(SIGNAL_QUEUE_CAPACITY);

    for kind in [
        SignalKind::interrupt(),
        SignalKind::quit(),
        SignalKind::terminate(),
    ] {
        let mut stream = signal(kind)?;
        let signum = kind.as_raw_value();
        let tx = tx.clone();

        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                if tx.send(signum).await.is_err() {
                    break;
                }
            }
        });
    }

    Ok(spawn_signal_handler(rx, shutdown))
}
