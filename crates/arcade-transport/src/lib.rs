//! Transport abstraction layer for Arcade.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the byte streams game clients connect with. Game clients speak a
//! text protocol over a raw duplex stream, so every implementation here
//! wraps something that is `AsyncRead + AsyncWrite`:
//!
//! - [`TcpTransport`] / [`TcpConnection`] for real clients
//! - [`memory_pair`] for in-process tests (backed by `tokio::io::duplex`)
//!
//! A `recv` returns whatever bytes one read produced. Reads carry no
//! message boundaries: a single read may contain several commands, or
//! only part of one. Reassembly is the protocol layer's job.

mod error;
mod stream;

pub use error::TransportError;
pub use stream::{
    MemoryConnection, ShutdownHandle, StreamConnection, TcpConnection,
    TcpTransport, memory_pair,
};

use std::fmt;
use std::future::Future;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send;

    /// Gracefully shuts down the transport, stopping new connections.
    fn shutdown(
        &self,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// A single connection that can send and receive bytes.
///
/// The futures are declared `Send` so that generic code (sessions,
/// handlers) holding a `C: Connection` can be moved onto a Tokio task.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends data to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receives the next chunk of bytes from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
