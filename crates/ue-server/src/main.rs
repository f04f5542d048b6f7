//! uds-echo server
//!
//! Listens on a UNIX domain socket and echoes each message back with a
//! prefix. SIGINT, SIGQUIT or SIGTERM stops the server gracefully.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ue_core::config::{self, HandlerErrorPolicy};
use ue_core::signal::{ignore_sigpipe, spawn_signal_listener};
use ue_server::EchoServer;

#[derive(Parser)]
#[command(name = "ue-server")]
#[command(about = "uds-echo server - echoes messages over a unix domain socket")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Socket path (overrides config)
    #[arg(short, long, env = "UDS_ECHO_SOCKET")]
    socket: Option<PathBuf>,

    /// What to do when a connection fails: exit or continue (overrides config)
    #[arg(long)]
    on_handler_error: Option<HandlerErrorPolicy>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    tracing::info!("AF_UNIX stream server, pid {}", std::process::id());

    ignore_sigpipe();
    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone()).context("Failed to install signal handlers")?;

    let mut config = config::resolve_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(socket) = args.socket {
        config.socket_path = socket;
    }
    if let Some(policy) = args.on_handler_error {
        config.server.on_handler_error = policy;
    }
    config.validate().context("Invalid configuration")?;

    let server = EchoServer::new(config.server, shutdown);
    let report = server.run(&config.socket_path).await?;

    tracing::info!(
        "Server shutdown complete ({} connections, {} echoed)",
        report.accepted,
        report.echoed
    );
    Ok(())
}
