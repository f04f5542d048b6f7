//! Echo server integration tests
//!
//! Runs the accept loop in-process against real unix sockets.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use ue_core::config::{HandlerErrorPolicy, ServerConfig};
use ue_core::{ExchangeError, SocketListener};
use ue_server::{EchoServer, ServeReport};

/// Server settings with short deadlines so failure paths finish quickly
fn fast_config() -> ServerConfig {
    ServerConfig {
        accept_timeout: Duration::from_millis(100),
        io_timeout: Duration::from_millis(300),
        ..ServerConfig::default()
    }
}

struct TestServer {
    path: PathBuf,
    shutdown: CancellationToken,
    handle: JoinHandle<Result<ServeReport>>,
}

impl TestServer {
    async fn start(dir: &TempDir, config: ServerConfig) -> Self {
        let path = dir.path().join("echo.sock");
        let listener = SocketListener::bind(&path)
            .await
            .expect("Failed to bind test socket");

        let shutdown = CancellationToken::new();
        let server = EchoServer::new(config, shutdown.clone());
        let handle = tokio::spawn(async move { server.serve(&listener).await });

        Self {
            path,
            shutdown,
            handle,
        }
    }

    async fn stop(self) -> Result<ServeReport> {
        self.shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .expect("server task panicked")
    }
}

async fn round_trip(path: &Path, message: &[u8]) -> Vec<u8> {
    let mut stream = UnixStream::connect(path).await.expect("Failed to connect");
    stream.write_all(message).await.expect("Failed to write");

    let mut reply = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut reply))
        .await
        .expect("reply timed out")
        .expect("Failed to read reply");
    reply
}

async fn wait_for_socket(path: &Path) {
    for _ in 0..100 {
        if path.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("socket {} never appeared", path.display());
}

#[tokio::test]
async fn test_round_trip() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::start(&dir, fast_config()).await;

    let reply = round_trip(&server.path, b"aaa111223").await;
    assert_eq!(reply, b"ok, aaa111223");

    let report = server.stop().await.unwrap();
    assert_eq!(report.accepted, 1);
    assert_eq!(report.echoed, 1);
}

#[tokio::test]
async fn test_connections_are_served_in_sequence() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::start(&dir, fast_config()).await;

    for message in ["one", "two", "three"] {
        let reply = round_trip(&server.path, message.as_bytes()).await;
        assert_eq!(reply, format!("ok, {}", message).into_bytes());
    }

    let report = server.stop().await.unwrap();
    assert_eq!(report.echoed, 3);
}

#[tokio::test]
async fn test_restart_on_same_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("echo.sock");

    for _ in 0..2 {
        let shutdown = CancellationToken::new();
        let server = EchoServer::new(fast_config(), shutdown.clone());
        let run_path = path.clone();
        let handle = tokio::spawn(async move { server.run(&run_path).await });

        wait_for_socket(&path).await;
        assert_eq!(round_trip(&path, b"again").await, b"ok, again");

        shutdown.cancel();
        handle.await.unwrap().unwrap();
        assert!(!path.exists(), "socket file should be removed on shutdown");
    }
}

#[tokio::test]
async fn test_accept_timeout_keeps_server_running() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::start(&dir, fast_config()).await;

    // Several accept deadlines pass with nobody connecting.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!server.handle.is_finished());

    let report = server.stop().await.unwrap();
    assert_eq!(report, ServeReport::default());
}

#[tokio::test]
async fn test_shutdown_does_not_wait_for_accept_deadline() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig {
        accept_timeout: Duration::from_secs(30),
        ..fast_config()
    };
    let server = TestServer::start(&dir, config).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_zero_length_read_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::start(&dir, fast_config()).await;

    let stream = UnixStream::connect(&server.path).await.unwrap();
    drop(stream);

    let reply = round_trip(&server.path, b"still here").await;
    assert_eq!(reply, b"ok, still here");

    let report = server.stop().await.unwrap();
    assert_eq!(report.accepted, 2);
    assert_eq!(report.peer_closed, 1);
    assert_eq!(report.echoed, 1);
}

#[tokio::test]
async fn test_silent_client_stops_server_by_default() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::start(&dir, fast_config()).await;

    let _silent = UnixStream::connect(&server.path).await.unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server should stop on its own")
        .unwrap()
        .unwrap_err();

    let exchange = err
        .downcast_ref::<ExchangeError>()
        .expect("handler error should be preserved");
    assert!(exchange.is_timeout());
    assert!(!server.path.exists());
}

#[tokio::test]
async fn test_silent_client_tolerated_with_continue_policy() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig {
        on_handler_error: HandlerErrorPolicy::Continue,
        ..fast_config()
    };
    let server = TestServer::start(&dir, config).await;

    let silent = UnixStream::connect(&server.path).await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    drop(silent);
    assert!(!server.handle.is_finished());

    let reply = round_trip(&server.path, b"after").await;
    assert_eq!(reply, b"ok, after");

    let report = server.stop().await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.echoed, 1);
}

#[tokio::test]
async fn test_oversized_message_is_truncated() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::start(&dir, fast_config()).await;

    let message: Vec<u8> = (0..300u32).map(|i| b'a' + (i % 26) as u8).collect();

    let mut stream = UnixStream::connect(&server.path).await.unwrap();
    stream.write_all(&message).await.unwrap();

    // The server closes with unread bytes pending, so read only the reply.
    let mut reply = vec![0u8; 4 + 256];
    tokio::time::timeout(Duration::from_secs(5), stream.read_exact(&mut reply))
        .await
        .expect("reply timed out")
        .unwrap();

    assert_eq!(&reply[..4], b"ok, ");
    assert_eq!(&reply[4..], &message[..256]);

    server.stop().await.unwrap();
}
