//! uds-echo client
//!
//! Sends one message to the echo server and prints the reply.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ue_client::{EchoClient, Exchange};
use ue_core::config;
use ue_core::signal::{ignore_sigpipe, spawn_signal_listener};

#[derive(Parser)]
#[command(name = "ue-client")]
#[command(about = "uds-echo client - sends one message over a unix domain socket")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Socket path (overrides config)
    #[arg(short, long, env = "UDS_ECHO_SOCKET")]
    socket: Option<PathBuf>,

    /// Message to send (overrides config)
    #[arg(short, long)]
    message: Option<String>,

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

    tracing::info!("AF_UNIX stream client, pid {}", std::process::id());

    ignore_sigpipe();
    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone()).context("Failed to install signal handlers")?;

    let mut config = config::resolve_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(socket) = args.socket {
        config.socket_path = socket;
    }
    if let Some(message) = args.message {
        config.client.message = message;
    }
    config.validate().context("Invalid configuration")?;

    let client = EchoClient::new(config.socket_path, config.client);
    match client.run(&shutdown).await? {
        Exchange::Reply { reply, .. } => {
            println!("recv [{}][{}]", reply.len(), String::from_utf8_lossy(&reply));
        }
        Exchange::PeerClosed { .. } => {
            println!("server closed the connection without replying");
        }
    }

    Ok(())
}
