//! UNIX domain socket listener that removes its socket file on close
//!
//! The socket file is unlinked when the [`SocketListener`] is dropped, so a
//! server that shuts down (cleanly or through an error) can be restarted on
//! the same path without manual cleanup.

use std::fs;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use tokio::net::unix::SocketAddr;
use tokio::net::{UnixListener, UnixStream};

/// Listening socket bound to a filesystem path
pub struct SocketListener {
    inner: UnixListener,
    path: PathBuf,
}

impl SocketListener {
    /// Bind a listening socket at `path`
    ///
    /// A socket file left behind by a process that is no longer listening is
    /// replaced. A path that a live server still answers on, or that is not
    /// a socket at all, is left untouched and reported as an error.
    pub async fn bind(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        remove_stale_socket(path).await?;

        let inner = UnixListener::bind(path)?;
        tracing::debug!(path = %path.display(), "Bound unix socket");

        Ok(Self {
            inner,
            path: path.to_path_buf(),
        })
    }

    /// Accept one incoming connection
    pub async fn accept(&self) -> io::Result<(UnixStream, SocketAddr)> {
        self.inner.accept().await
    }

    /// Path of the socket file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SocketListener {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed unix socket"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove socket file {:?}: {}", self.path, e),
        }
    }
}

/// Remove `path` if it is a socket nobody is listening on
async fn remove_stale_socket(path: &Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if !metadata.file_type().is_socket() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists and is not a socket", path.display()),
        ));
    }

    match UnixStream::connect(path).await {
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AddrInUse,
            format!("another server is listening on {}", path.display()),
        )),
        Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
            tracing::info!(path = %path.display(), "Removing stale socket file");
            match fs::remove_file(path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Render a peer address for status lines
///
/// Client sockets are usually unnamed, which shows up as `(unnamed)`.
pub fn describe_addr(addr: &SocketAddr) -> String {
    match addr.as_pathname() {
        Some(path) => path.display().to_string(),
        None => "(unnamed)".to_string(),
    }
}
