//! Error types for the protocol layer.
//!
//! Protocol errors come in two severities, and callers must treat them
//! differently:
//!
//! - **Framing errors** ([`MissingSigil`](ProtocolError::MissingSigil),
//!   [`InvalidUtf8`](ProtocolError::InvalidUtf8),
//!   [`Oversized`](ProtocolError::Oversized)) mean the byte stream itself
//!   can no longer be trusted. The connection must be dropped.
//! - **Decode errors** (everything else) mean one well-framed command had
//!   bad fields. The command is discarded and the connection carries on.
//!
//! [`is_fatal`](ProtocolError::is_fatal) encodes that split so nobody has
//! to remember which variant is which.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A complete command did not start with the sigil the current phase
    /// expects.
    #[error("expected sigil '{expected}' in command {command:?}")]
    MissingSigil {
        /// The sigil that was required.
        expected: char,
        /// The offending command, without its terminator.
        command: String,
    },

    /// A complete command was not valid UTF-8.
    #[error("command is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// More than the allowed number of bytes arrived without a terminator.
    #[error("unterminated command exceeds {0} bytes")]
    Oversized(usize),

    /// The command's verb is not one this side of the protocol understands.
    #[error("unknown verb '{0}'")]
    UnknownVerb(String),

    /// A known verb carried fields that could not be parsed.
    #[error("malformed '{verb}' command: {reason}")]
    Malformed {
        /// The verb whose fields were bad.
        verb: String,
        /// What was wrong with them.
        reason: String,
    },

    /// A `?game:` declaration named a game the server does not have.
    #[error("unknown game kind '{0}'")]
    UnknownGameKind(String),

    /// A display name was empty, too long, or contained reserved characters.
    #[error("invalid username '{0}'")]
    InvalidUsername(String),
}

impl ProtocolError {
    /// Shorthand for building a [`Malformed`](Self::Malformed) error.
    pub fn malformed(verb: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            verb: verb.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the connection that produced this error must be
    /// closed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingSigil { .. } | Self::InvalidUtf8(_) | Self::Oversized(_)
        )
    }
}
