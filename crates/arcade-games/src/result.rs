//! The uniform end-of-match result.

use arcade_protocol::{Color, EndReason, GameKind, ServerCommand};

/// Who won, in the terms of the game that was played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Winner {
    /// Stratego: the side that captured the flag.
    Color(Color),
    /// Word Golf: the player with the lower score.
    Username(String),
    /// Secret Game: the racer's seat index.
    Index(usize),
}

impl Winner {
    /// The `?game-over` payload for this winner.
    pub fn payload(&self) -> String {
        match self {
            Self::Color(color) => color.to_string(),
            Self::Username(name) => name.clone(),
            Self::Index(index) => index.to_string(),
        }
    }
}

/// The outcome of one match. Created once, when the match stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub winner: Option<Winner>,
    pub abrupt_end: bool,
}

impl GameResult {
    pub fn won_by(winner: Winner) -> Self {
        Self {
            winner: Some(winner),
            abrupt_end: false,
        }
    }

    pub fn tie() -> Self {
        Self {
            winner: None,
            abrupt_end: false,
        }
    }

    /// A match cut short by a lost connection.
    pub fn abrupt() -> Self {
        Self {
            winner: None,
            abrupt_end: true,
        }
    }

    pub fn reason(&self) -> EndReason {
        match (&self.winner, self.abrupt_end) {
            (Some(_), _) => EndReason::WinnerDetermined,
            (None, true) => EndReason::AbruptEnd,
            (None, false) => EndReason::Tie,
        }
    }

    /// The terminal command broadcast to every participant.
    pub fn game_over(&self, kind: GameKind) -> ServerCommand {
        ServerCommand::GameOver {
            kind,
            reason: self.reason(),
            payload: self.winner.as_ref().map(Winner::payload),
        }
    }
}
