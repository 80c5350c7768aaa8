//! Core vocabulary shared by every command on the wire.
//!
//! These are the small value types that commands are built from: which
//! game is being played, which side a player sits on, board coordinates,
//! and the fixed keywords the text protocol uses for each of them.
//!
//! Every type here has a canonical wire spelling. `as_str`/`as_char`
//! produce it and `FromStr`/`from_char` parse it back, so the command
//! codec never spells a keyword by hand.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Character appended after every command on the stream.
///
/// Several commands may arrive in one read, and a single command may be
/// split over several reads. The terminator is how the receiver tells
/// where one command ends.
pub const TERMINATOR: char = '\\';

/// Sigil of server-to-client events and of the pre-match declaration.
pub const QUERY_SIGIL: char = '?';

/// Sigil of in-game client intents.
pub const INTENT_SIGIL: char = '!';

/// Longest accepted display name, in characters.
pub const MAX_USERNAME_LEN: usize = 20;

// ---------------------------------------------------------------------------
// GameKind
// ---------------------------------------------------------------------------

/// The three game types the server knows how to run.
///
/// `#[serde(rename_all = "snake_case")]` makes the config-file spelling
/// match the wire spelling (`"word_golf"`, not `"WordGolf"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    /// Turn-based board game with hidden ranks and combat.
    Stratego,
    /// Concurrent word-guessing duel.
    WordGolf,
    /// Real-time top-down racing game.
    SecretGame,
}

impl GameKind {
    /// Every game kind, in a stable order.
    pub const ALL: [GameKind; 3] =
        [GameKind::Stratego, GameKind::WordGolf, GameKind::SecretGame];

    /// The wire spelling of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stratego => "stratego",
            Self::WordGolf => "word_golf",
            Self::SecretGame => "secret_game",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stratego" => Ok(Self::Stratego),
            "word_golf" => Ok(Self::WordGolf),
            "secret_game" => Ok(Self::SecretGame),
            other => Err(ProtocolError::UnknownGameKind(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Seat
// ---------------------------------------------------------------------------

/// A player's position in a two-player match.
///
/// The matchmaking queue gives `First` to the earlier arrival. What a
/// seat means is game-specific: in Stratego `First` plays red and moves
/// first, in the racing game it is player index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    /// Both seats, first then second.
    pub const BOTH: [Seat; 2] = [Seat::First, Seat::Second];

    /// Zero-based index of this seat (`First` = 0).
    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// The opposing seat.
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Second => f.write_str("second"),
        }
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A Stratego side. Red always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Blue,
}

impl Color {
    /// The single-character wire spelling (`r` or `b`).
    pub fn as_char(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Blue => 'b',
        }
    }

    /// Parses the single-character wire spelling.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'r' => Some(Self::Red),
            'b' => Some(Self::Blue),
            _ => None,
        }
    }

    /// The color that sits in the given seat.
    pub fn for_seat(seat: Seat) -> Self {
        match seat {
            Seat::First => Self::Red,
            Seat::Second => Self::Blue,
        }
    }

    /// The seat that plays this color.
    pub fn seat(self) -> Seat {
        match self {
            Self::Red => Seat::First,
            Self::Blue => Seat::Second,
        }
    }

    /// The other color.
    pub fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Color {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next().and_then(Self::from_char), chars.next()) {
            (Some(color), None) => Ok(color),
            _ => Err(ProtocolError::malformed("color", format!("'{s}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// BoardPos
// ---------------------------------------------------------------------------

/// A cell on the Stratego board, as `(row, col)`.
///
/// Parsing only checks that both fields are non-negative integers. Range
/// checks against the board size belong to the game rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardPos {
    pub row: usize,
    pub col: usize,
}

impl BoardPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for BoardPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Keyword enums
// ---------------------------------------------------------------------------

/// Steering input for a racing car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Straight,
    Left,
    Right,
}

impl TurnState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Straight => "straight",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl FromStr for TurnState {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "straight" => Ok(Self::Straight),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(ProtocolError::malformed(
                "car-turn",
                format!("unknown turn state '{other}'"),
            )),
        }
    }
}

/// How a Stratego move played out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResultKind {
    /// The piece moved into an empty cell.
    Movement,
    /// The attacker won and now occupies the destination.
    AttackSuccess,
    /// The defender won; the attacker was removed.
    AttackFail,
    /// Equal strength; both pieces were removed.
    Tie,
}

impl MoveResultKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movement => "movement",
            Self::AttackSuccess => "attack_success",
            Self::AttackFail => "attack_fail",
            Self::Tie => "tie",
        }
    }

    /// `true` for every outcome that involved combat.
    pub fn is_attack(self) -> bool {
        !matches!(self, Self::Movement)
    }
}

impl FromStr for MoveResultKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movement" => Ok(Self::Movement),
            "attack_success" => Ok(Self::AttackSuccess),
            "attack_fail" => Ok(Self::AttackFail),
            "tie" => Ok(Self::Tie),
            other => Err(ProtocolError::malformed(
                "move-result",
                format!("unknown result kind '{other}'"),
            )),
        }
    }
}

/// Why a match ended, as carried by `?game-over`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    WinnerDetermined,
    AbruptEnd,
    Tie,
}

impl EndReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WinnerDetermined => "winner-determined",
            Self::AbruptEnd => "abrupt-end",
            Self::Tie => "tie",
        }
    }
}

impl FromStr for EndReason {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "winner-determined" => Ok(Self::WinnerDetermined),
            "abrupt-end" => Ok(Self::AbruptEnd),
            "tie" => Ok(Self::Tie),
            other => Err(ProtocolError::malformed(
                "game-over",
                format!("unknown reason '{other}'"),
            )),
        }
    }
}

/// One-off notifications pushed to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// The opponent sent one of their stashed words into this player's queue.
    ReceivedWord,
}

impl Alert {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReceivedWord => "received-word",
        }
    }
}

impl FromStr for Alert {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received-word" => Ok(Self::ReceivedWord),
            other => Err(ProtocolError::malformed(
                "alert",
                format!("unknown alert '{other}'"),
            )),
        }
    }
}

/// Checks that a display name is usable on the wire.
///
/// Names are not authenticated. They only need to be non-empty, at most
/// [`MAX_USERNAME_LEN`] characters, and free of the protocol's reserved
/// characters.
pub fn validate_username(name: &str) -> Result<(), ProtocolError> {
    let len = name.chars().count();
    let reserved = name.contains([':', TERMINATOR, QUERY_SIGIL, INTENT_SIGIL]);
    if len == 0 || len > MAX_USERNAME_LEN || reserved {
        return Err(ProtocolError::InvalidUsername(name.to_string()));
    }
    Ok(())
}
