//! Race track maps.
//!
//! A map is plain text, one character per tile:
//!
//! | Char | Tile       |
//! |------|------------|
//! | `#`  | wall       |
//! | `X`  | dead zone  |
//! | `L`  | start line |
//! | `A`  | checkpoint A |
//! | `B`  | checkpoint B |
//! | `1`  | seat 1 spawn |
//! | `2`  | seat 2 spawn |
//! | ` `  | track      |
//!
//! Tile `(col, row)` covers pixels `col * tile_size ..= (col + 1) *
//! tile_size` horizontally, and likewise for rows.

use std::path::Path;

use crate::GameError;

use super::car::Vec2;

const BUILTIN: &str = "\
####################
#   L       A      #
# 1 L       A      #
# 2 L       A      #
#   ##########     #
#   #XXXXXXXX#     #
#   #XXXXXXXX#     #
#   ##########     #
#       B          #
#       B          #
#       B          #
####################
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    DeadZone,
    Line,
    CheckpointA,
    CheckpointB,
    /// A spawn tile is ordinary track once the race is running.
    Spawn(usize),
    Track,
}

impl Tile {
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '#' => Self::Wall,
            'X' => Self::DeadZone,
            'L' => Self::Line,
            'A' => Self::CheckpointA,
            'B' => Self::CheckpointB,
            '1' => Self::Spawn(0),
            '2' => Self::Spawn(1),
            ' ' => Self::Track,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackMap {
    rows: Vec<Vec<Tile>>,
    tile_size: f32,
    /// Pixel centers of the two spawn tiles, indexed by seat.
    spawns: [Vec2; 2],
}

impl TrackMap {
    /// The built-in track: one loop around a dead-zone pit.
    pub fn builtin(tile_size: f32) -> Result<Self, GameError> {
        Self::parse(BUILTIN, tile_size)
    }

    /// Parses a map. Trailing whitespace on each line is dropped, so
    /// lines may be ragged; anything past a row's end is wall.
    ///
    /// # Errors
    /// Unknown characters, or a spawn tile that is missing or repeated.
    pub fn parse(text: &str, tile_size: f32) -> Result<Self, GameError> {
        let mut rows = Vec::new();
        let mut spawns: [Option<Vec2>; 2] = [None, None];

        for (r, line) in text.lines().enumerate() {
            let mut row = Vec::new();
            for (c, ch) in line.trim_end().chars().enumerate() {
                let tile = Tile::from_char(ch).ok_or_else(|| {
                    GameError::InvalidMap(format!("unknown tile '{ch}' at row {r}, column {c}"))
                })?;
                if let Tile::Spawn(seat) = tile {
                    if spawns[seat].is_some() {
                        return Err(GameError::InvalidMap(format!("spawn {} appears twice", seat + 1)));
                    }
                    spawns[seat] = Some(Vec2::new(
                        (c as f32 + 0.5) * tile_size,
                        (r as f32 + 0.5) * tile_size,
                    ));
                }
                row.push(tile);
            }
            rows.push(row);
        }

        match spawns {
            [Some(first), Some(second)] => Ok(Self {
                rows,
                tile_size,
                spawns: [first, second],
            }),
            _ => Err(GameError::InvalidMap("both spawn tiles are required".into())),
        }
    }

    /// Reads and parses a map file.
    pub async fn load(path: &Path, tile_size: f32) -> Result<Self, GameError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| GameError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&text, tile_size)
    }

    pub fn spawn(&self, index: usize) -> Vec2 {
        self.spawns[index]
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Map extent in pixels: `(width, height)`.
    pub fn size(&self) -> (f32, f32) {
        let cols = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        (cols as f32 * self.tile_size, self.rows.len() as f32 * self.tile_size)
    }

    /// The tile under a pixel. Anything outside the map is wall.
    pub fn tile_at(&self, point: Vec2) -> Tile {
        if point.x < 0.0 || point.y < 0.0 {
            return Tile::Wall;
        }
        let col = (point.x / self.tile_size) as usize;
        let row = (point.y / self.tile_size) as usize;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(Tile::Wall)
    }
}
