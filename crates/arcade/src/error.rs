//! Unified error type for the Arcade server.

use arcade_games::GameError;
use arcade_protocol::ProtocolError;
use arcade_session::SessionError;
use arcade_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ArcadeError {
    /// Binding, accepting, or a connection failing.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A malformed declaration or a framing violation.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A link or matchmaking failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Game assets that could not be loaded, or an invalid loadout.
    #[error(transparent)]
    Game(#[from] GameError),
}

#[cfg(test)]
mod tests {
    use arcade_protocol::GameKind;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::BindFailed(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "port taken",
        ));
        let arcade_err: ArcadeError = err.into();
        assert!(matches!(arcade_err, ArcadeError::Transport(_)));
        assert!(arcade_err.to_string().contains("port taken"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidUsername("a:b".into());
        let arcade_err: ArcadeError = err.into();
        assert!(matches!(arcade_err, ArcadeError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::QueueClosed(GameKind::Stratego);
        let arcade_err: ArcadeError = err.into();
        assert!(matches!(arcade_err, ArcadeError::Session(_)));
        assert!(arcade_err.to_string().contains("stratego"));
    }

    #[test]
    fn test_from_game_error() {
        let err = GameError::InvalidMap("no spawns".into());
        let arcade_err: ArcadeError = err.into();
        assert!(matches!(arcade_err, ArcadeError::Game(_)));
    }
}
