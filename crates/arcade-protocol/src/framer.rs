//! Reassembly of terminator-delimited commands from a byte stream.
//!
//! TCP delivers bytes, not messages. One `recv` may return half a
//! command, or three and a half. The [`CommandFramer`] keeps whatever is
//! left over between reads and hands out only complete commands.
//!
//! It also enforces the first two rules of the protocol:
//!
//! 1. Every complete command starts with the sigil the current
//!    [`Phase`] expects. Anything else is a framing violation and the
//!    connection must be dropped.
//! 2. Only verbs on the phase's allow-list are forwarded. Other commands
//!    are logged and skipped, and the connection carries on.

use tracing::debug;

use crate::types::{GameKind, INTENT_SIGIL, QUERY_SIGIL, TERMINATOR};
use crate::ProtocolError;

/// Largest number of bytes buffered without seeing a terminator.
pub const MAX_PENDING_BYTES: usize = 64 * 1024;

/// Which part of the protocol a connection is currently speaking.
///
/// Each phase fixes the sigil every command must carry and the verbs
/// that are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before matchmaking: only the `?game` declaration.
    Lobby,
    /// In a Stratego match: `!move`.
    Stratego,
    /// In a Word Golf match: `!guess` and `!send-stashed-word`.
    WordGolf,
    /// In a race: `!car-turn`.
    SecretGame,
    /// Reading the server's side of the stream (clients and tests).
    Client,
}

impl Phase {
    /// The in-match phase for a game kind.
    pub fn for_game(kind: GameKind) -> Self {
        match kind {
            GameKind::Stratego => Self::Stratego,
            GameKind::WordGolf => Self::WordGolf,
            GameKind::SecretGame => Self::SecretGame,
        }
    }

    /// The sigil every command in this phase must start with.
    pub fn sigil(self) -> char {
        match self {
            Self::Lobby | Self::Client => QUERY_SIGIL,
            Self::Stratego | Self::WordGolf | Self::SecretGame => INTENT_SIGIL,
        }
    }

    /// Verbs forwarded in this phase.
    pub fn allowed_verbs(self) -> &'static [&'static str] {
        match self {
            Self::Lobby => &["game"],
            Self::Stratego => &["move"],
            Self::WordGolf => &["guess", "send-stashed-word"],
            Self::SecretGame => &["car-turn"],
            Self::Client => &[
                "game-start",
                "turn-info",
                "move-result",
                "update",
                "feedback-history",
                "stashed-words",
                "alert",
                "countdown",
                "race-start",
                "pos",
                "angle",
                "lap-completion",
                "game-over",
            ],
        }
    }

    pub fn allows(self, verb: &str) -> bool {
        self.allowed_verbs().contains(&verb)
    }
}

/// Per-connection command reassembly buffer.
///
/// ```rust
/// use arcade_protocol::{CommandFramer, Phase};
///
/// let mut framer = CommandFramer::new(Phase::WordGolf);
/// assert!(framer.feed(b"!guess:CR").unwrap().is_empty());
/// let commands = framer.feed(b"ANE\\!guess:SL").unwrap();
/// assert_eq!(commands, vec!["!guess:CRANE".to_string()]);
/// assert_eq!(framer.pending(), b"!guess:SL".len());
/// ```
#[derive(Debug)]
pub struct CommandFramer {
    buffer: Vec<u8>,
    phase: Phase,
    /// A fatal error found after some commands of the same read were
    /// already extracted. Reported by the next `feed`.
    failure: Option<ProtocolError>,
}

impl CommandFramer {
    pub fn new(phase: Phase) -> Self {
        Self {
            buffer: Vec::new(),
            phase,
            failure: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Switches to another phase. Bytes already buffered are kept and will
    /// be validated against the new phase.
    pub fn set_phase(&mut self, phase: Phase) {
        debug!(from = ?self.phase, to = ?phase, "framer phase change");
        self.phase = phase;
    }

    /// Number of buffered bytes that do not yet form a complete command.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Appends `bytes` and returns every complete, allowed command, in
    /// order and without terminators.
    ///
    /// When a fatal error is found after other commands of the same read,
    /// those commands are still returned; the error is held back and
    /// returned by the next call (see [`take_failure`](Self::take_failure)).
    /// Nothing after the offending command is ever delivered.
    ///
    /// # Errors
    /// Any error returned here is fatal for the connection (see
    /// [`ProtocolError::is_fatal`]).
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<String>, ProtocolError> {
        if let Some(failure) = self.failure.take() {
            return Err(failure);
        }
        self.buffer.extend_from_slice(bytes);

        let mut commands = Vec::new();
        let terminator = TERMINATOR as u8;
        while let Some(end) = self.buffer.iter().position(|b| *b == terminator) {
            let mut raw: Vec<u8> = self.buffer.drain(..=end).collect();
            raw.pop();
            let command = match String::from_utf8(raw) {
                Ok(command) => command,
                Err(e) => return self.fail(commands, e.into()),
            };

            if !command.starts_with(self.phase.sigil()) {
                let error = ProtocolError::MissingSigil {
                    expected: self.phase.sigil(),
                    command,
                };
                return self.fail(commands, error);
            }

            let verb = command[1..].split(':').next().unwrap_or_default();
            if self.phase.allows(verb) {
                commands.push(command);
            } else {
                debug!(phase = ?self.phase, %command, "dropping command not allowed in phase");
            }
        }

        if self.buffer.len() > MAX_PENDING_BYTES {
            return self.fail(commands, ProtocolError::Oversized(MAX_PENDING_BYTES));
        }
        Ok(commands)
    }

    /// The fatal error held back by the last `feed`, if any.
    pub fn take_failure(&mut self) -> Option<ProtocolError> {
        self.failure.take()
    }

    fn fail(
        &mut self,
        commands: Vec<String>,
        error: ProtocolError,
    ) -> Result<Vec<String>, ProtocolError> {
        self.buffer.clear();
        if commands.is_empty() {
            return Err(error);
        }
        self.failure = Some(error);
        Ok(commands)
    }
}
