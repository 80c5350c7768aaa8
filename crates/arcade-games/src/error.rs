//! Error types for the games layer.

use std::path::PathBuf;

/// Errors raised while building a game: bad loadouts, bad assets.
///
/// Nothing in here is raised by a running game. Rule violations during
/// play are logged and ignored, and connection failures end the match
/// with an abrupt-end result instead.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A Stratego deck had the wrong size, unknown pieces, or no flag.
    #[error("invalid deck: {0}")]
    InvalidDeck(String),

    /// A race track description could not be parsed.
    #[error("invalid track map: {0}")]
    InvalidMap(String),

    /// A word list was empty or contained unusable entries.
    #[error("invalid word bank: {0}")]
    InvalidWordBank(String),

    /// An asset file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
