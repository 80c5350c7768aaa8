//! A player's framed connection.
//!
//! [`PlayerLink`] pairs a [`Connection`] with its [`CommandFramer`] so the
//! rest of the server reads typed [`ClientCommand`]s and writes typed
//! [`ServerCommand`]s without thinking about bytes or terminators.
//!
//! Reads are bounded by a caller-chosen wait. A session loop serving two
//! players polls each one briefly in turn, and a silent player yields
//! [`Inbound::Idle`] instead of blocking the other.

use std::time::Duration;

use arcade_protocol::{ClientCommand, CommandFramer, Phase, ServerCommand};
use arcade_transport::{Connection, ConnectionId};

use crate::SessionError;

/// Result of one bounded read.
#[derive(Debug, PartialEq, Eq)]
pub enum Inbound {
    /// Nothing arrived before the wait elapsed.
    Idle,
    /// Bytes arrived. Holds every complete command they finished, which
    /// may be none if only part of a command came in.
    Commands(Vec<ClientCommand>),
}

/// A connection plus the per-connection reassembly buffer.
pub struct PlayerLink<C: Connection> {
    conn: C,
    framer: CommandFramer,
}

impl<C: Connection> PlayerLink<C> {
    pub fn new(conn: C, phase: Phase) -> Self {
        Self {
            conn,
            framer: CommandFramer::new(phase),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.conn.id()
    }

    pub fn phase(&self) -> Phase {
        self.framer.phase()
    }

    /// Moves the link into another protocol phase (lobby → in-match).
    pub fn set_phase(&mut self, phase: Phase) {
        self.framer.set_phase(phase);
    }

    /// Waits up to `wait` for bytes from the peer.
    ///
    /// Commands that frame correctly but fail to decode are logged and
    /// dropped here, so callers only see well-formed commands.
    ///
    /// A framing violation that follows valid commands in the same read
    /// is reported by the next call, after those commands are delivered.
    ///
    /// # Errors
    /// Disconnects, I/O failures, and framing violations. All are fatal.
    pub async fn poll(&mut self, wait: Duration) -> Result<Inbound, SessionError> {
        let id = self.conn.id();
        if let Some(failure) = self.framer.take_failure() {
            return Err(failure.into());
        }
        let bytes = match tokio::time::timeout(wait, self.conn.recv()).await {
            Err(_elapsed) => return Ok(Inbound::Idle),
            Ok(Ok(Some(bytes))) => bytes,
            Ok(Ok(None)) => return Err(SessionError::Disconnected(id)),
            Ok(Err(e)) => return Err(SessionError::transport(id, e)),
        };

        let raw = self.framer.feed(&bytes)?;
        let mut commands = Vec::with_capacity(raw.len());
        for text in raw {
            match ClientCommand::decode(&text) {
                Ok(cmd) => commands.push(cmd),
                Err(e) => {
                    tracing::debug!(%id, command = %text, error = %e, "dropping undecodable command");
                }
            }
        }
        Ok(Inbound::Commands(commands))
    }

    /// Sends one command, terminator included.
    pub async fn send(&self, cmd: &ServerCommand) -> Result<(), SessionError> {
        let id = self.conn.id();
        tracing::trace!(%id, command = %cmd, "send");
        self.conn
            .send(cmd.frame().as_bytes())
            .await
            .map_err(|e| SessionError::transport(id, e))
    }

    /// Closes the underlying connection, logging rather than returning
    /// failures.
    pub async fn close(&self) {
        if let Err(e) = self.conn.close().await {
            tracing::debug!(id = %self.conn.id(), error = %e, "close failed");
        }
    }
}
