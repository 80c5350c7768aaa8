//! Byte-stream connections over TCP and in-memory pipes.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{
    AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream,
    ReadHalf, WriteHalf,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, watch};

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Size of the buffer handed to a single `read` call.
const READ_CHUNK: usize = 4096;

/// Capacity of each direction of an in-memory pipe.
const MEMORY_PIPE_CAPACITY: usize = 64 * 1024;

fn next_id() -> ConnectionId {
    ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

// ---------------------------------------------------------------------------
// StreamConnection
// ---------------------------------------------------------------------------

/// A [`Connection`] over any duplex byte stream.
///
/// The stream is split so a pending `recv` never blocks a `send` from
/// another task.
pub struct StreamConnection<S> {
    id: ConnectionId,
    reader: Mutex<ReadHalf<S>>,
    writer: Mutex<WriteHalf<S>>,
}

/// A connection accepted by [`TcpTransport`].
pub type TcpConnection = StreamConnection<TcpStream>;

/// One end of an in-memory pipe created by [`memory_pair`].
pub type MemoryConnection = StreamConnection<DuplexStream>;

impl<S> StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Wraps a stream, assigning it a fresh [`ConnectionId`].
    pub fn new(stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            id: next_id(),
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }
}

impl<S> Connection for StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let mut writer = self.writer.lock().await;
        writer.write_all(data).await.map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut buf = vec![0u8; READ_CHUNK];
        let n = self
            .reader
            .lock()
            .await
            .read(&mut buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

/// Creates two connected in-memory connections.
///
/// Bytes sent on one end are received on the other. Dropping or closing
/// one end makes the other's `recv` return `Ok(None)`.
pub fn memory_pair() -> (MemoryConnection, MemoryConnection) {
    let (a, b) = tokio::io::duplex(MEMORY_PIPE_CAPACITY);
    (StreamConnection::new(a), StreamConnection::new(b))
}

// ---------------------------------------------------------------------------
// TcpTransport
// ---------------------------------------------------------------------------

/// A TCP [`Transport`] that listens for incoming game clients.
pub struct TcpTransport {
    listener: TcpListener,
    shut_down: Arc<watch::Sender<bool>>,
}

/// Stops a [`TcpTransport`] from another task, waking an `accept` that is
/// already waiting.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    shut_down: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        if !self.shut_down.send_replace(true) {
            tracing::info!("TCP transport shut down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shut_down.borrow()
    }
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self {
            listener,
            shut_down: Arc::new(watch::channel(false).0),
        })
    }

    /// Returns the address the listener is actually bound to.
    ///
    /// Useful after binding to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shut_down: Arc::clone(&self.shut_down),
        }
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let mut shut_down = self.shut_down.subscribe();
        if *shut_down.borrow_and_update() {
            return Err(TransportError::Shutdown);
        }

        let (stream, addr) = tokio::select! {
            accepted = self.listener.accept() => accepted.map_err(TransportError::AcceptFailed)?,
            _ = shut_down.wait_for(|stopped| *stopped) => return Err(TransportError::Shutdown),
        };

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%addr, error = %e, "could not set TCP_NODELAY");
        }

        let conn = StreamConnection::new(stream);
        tracing::debug!(id = %conn.id(), %addr, "accepted TCP connection");
        Ok(conn)
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        self.shutdown_handle().shutdown();
        Ok(())
    }
}
