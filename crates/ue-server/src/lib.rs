//! ue-server: UNIX domain socket echo server
//!
//! The server accepts one connection at a time. Each connection gets exactly
//! one read and one write: the received bytes are echoed back behind a fixed
//! prefix and the connection is closed.

pub mod handler;
pub mod server;

pub use handler::{build_reply, handle_connection, HandleOutcome};
pub use server::{EchoServer, ServeReport};
