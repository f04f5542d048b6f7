//! ue-client: UNIX domain socket echo client
//!
//! Connects to the echo server, sends one message and reads one reply.

mod client;

pub use client::{send_and_receive, EchoClient, Exchange};
