//! Error types for the session layer.

use arcade_protocol::{GameKind, ProtocolError};
use arcade_transport::ConnectionId;

/// Errors that can occur while talking to a player or matchmaking them.
///
/// Every variant is fatal for the connection it concerns. A read that
/// simply timed out is not an error at all; it is reported as
/// [`Inbound::Idle`](crate::Inbound::Idle).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The peer closed the connection.
    #[error("{0} disconnected")]
    Disconnected(ConnectionId),

    /// Reading from or writing to the connection failed.
    #[error("transport error on {id}: {source}")]
    Transport {
        id: ConnectionId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The peer broke the framing rules.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The matchmaking queue's dispatcher is gone, so nothing can be paired.
    #[error("{0} matchmaking is closed")]
    QueueClosed(GameKind),
}

impl SessionError {
    pub(crate) fn transport(
        id: ConnectionId,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            id,
            source: Box::new(source),
        }
    }
}
