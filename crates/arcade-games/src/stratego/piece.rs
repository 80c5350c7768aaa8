//! Piece ranks and starting decks.

use std::fmt;

use arcade_protocol::Color;

use crate::GameError;

/// Number of cells in a deck: four rows of ten.
pub const DECK_SIZE: usize = 40;

/// A piece's rank. Each has a one-character wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    Spy,
    Scout,
    Miner,
    Sergeant,
    Lieutenant,
    Captain,
    Major,
    Colonel,
    General,
    Marshal,
    Bomb,
    Flag,
}

impl Rank {
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'S' => Self::Spy,
            '8' => Self::Scout,
            '5' => Self::Miner,
            '4' => Self::Sergeant,
            'L' => Self::Lieutenant,
            'C' => Self::Captain,
            '3' => Self::Major,
            '2' => Self::Colonel,
            'G' => Self::General,
            '1' => Self::Marshal,
            'B' => Self::Bomb,
            'F' => Self::Flag,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Spy => 'S',
            Self::Scout => '8',
            Self::Miner => '5',
            Self::Sergeant => '4',
            Self::Lieutenant => 'L',
            Self::Captain => 'C',
            Self::Major => '3',
            Self::Colonel => '2',
            Self::General => 'G',
            Self::Marshal => '1',
            Self::Bomb => 'B',
            Self::Flag => 'F',
        }
    }

    /// Combat strength. Higher wins; equal strengths trade.
    pub fn strength(self) -> u32 {
        match self {
            Self::Flag => 0,
            Self::Spy => 1,
            Self::Scout => 2,
            Self::Miner => 3,
            Self::Sergeant => 4,
            Self::Lieutenant => 5,
            Self::Captain => 6,
            Self::Major => 7,
            Self::Colonel => 8,
            Self::General => 9,
            Self::Marshal => 10,
            Self::Bomb => 999,
        }
    }

    /// Bombs and flags never move.
    pub fn is_movable(self) -> bool {
        !matches!(self, Self::Bomb | Self::Flag)
    }

    /// Whether this piece wins when it attacks `defender`, counting the
    /// two special cases: the spy takes the marshal, the miner defuses
    /// bombs.
    pub fn beats_when_attacking(self, defender: Rank) -> bool {
        match (self, defender) {
            (_, Self::Flag) => true,
            (Self::Spy, Self::Marshal) => true,
            (Self::Miner, Self::Bomb) => true,
            _ => self.strength() > defender.strength(),
        }
    }
}

/// A piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub color: Color,
    pub rank: Rank,
}

impl Piece {
    pub fn new(color: Color, rank: Rank) -> Self {
        Self { color, rank }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color.as_char(), self.rank.as_char())
    }
}

/// A player's 40 starting pieces.
///
/// Index `r * 10 + c` is row `r` (0 = back row) and column `c` of the
/// player's own side, as they see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck([Rank; DECK_SIZE]);

impl Deck {
    /// Parses the extra fields of a Stratego declaration.
    ///
    /// # Errors
    /// Wrong cell count, an unknown piece character, or a flag count
    /// other than one.
    pub fn parse<S: AsRef<str>>(cells: &[S]) -> Result<Self, GameError> {
        if cells.len() != DECK_SIZE {
            return Err(GameError::InvalidDeck(format!(
                "expected {DECK_SIZE} cells, got {}",
                cells.len()
            )));
        }

        let mut ranks = [Rank::Flag; DECK_SIZE];
        for (slot, cell) in ranks.iter_mut().zip(cells) {
            let cell = cell.as_ref();
            let mut chars = cell.chars();
            *slot = match (chars.next().and_then(Rank::from_char), chars.next()) {
                (Some(rank), None) => rank,
                _ => {
                    return Err(GameError::InvalidDeck(format!("unknown piece '{cell}'")));
                }
            };
        }

        let flags = ranks.iter().filter(|r| **r == Rank::Flag).count();
        if flags != 1 {
            return Err(GameError::InvalidDeck(format!(
                "expected exactly one flag, got {flags}"
            )));
        }
        Ok(Self(ranks))
    }

    /// A legal deck with the classic piece counts, scouts along the front.
    pub fn standard() -> Self {
        const LAYOUT: &str = concat!(
            "FBBBBBB1G2", // back row
            "2333CCCCLL",
            "LL44445555",
            "5S88888888", // front row
        );
        let mut ranks = [Rank::Flag; DECK_SIZE];
        for (slot, c) in ranks.iter_mut().zip(LAYOUT.chars()) {
            *slot = Rank::from_char(c).unwrap_or(Rank::Scout);
        }
        Self(ranks)
    }

    /// The rank at deck row `r`, column `c`.
    pub fn at(&self, r: usize, c: usize) -> Rank {
        self.0[r * 10 + c]
    }

    /// The wire encoding, one character per cell.
    pub fn cells(&self) -> Vec<String> {
        self.0.iter().map(|r| r.as_char().to_string()).collect()
    }
}
