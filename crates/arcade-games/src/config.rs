//! Per-game configuration.
//!
//! Every struct here is `#[serde(default)]`, so a config file only needs
//! to name the values it changes. Durations are stored as integer
//! milliseconds to keep the JSON readable.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GamesConfig
// ---------------------------------------------------------------------------

/// Settings for all three games.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GamesConfig {
    pub stratego: StrategoConfig,
    pub word_golf: WordGolfConfig,
    pub secret_game: SecretGameConfig,
}

// ---------------------------------------------------------------------------
// Stratego
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategoConfig {
    /// Pause after a plain move, before the next turn is announced.
    pub move_pause_ms: u64,
    /// Pause after an attack or tie, long enough for clients to show it.
    pub capture_pause_ms: u64,
    /// How long the session waits on one player before checking the other.
    pub read_timeout_ms: u64,
}

impl Default for StrategoConfig {
    fn default() -> Self {
        Self {
            move_pause_ms: 1_000,
            capture_pause_ms: 5_000,
            read_timeout_ms: 50,
        }
    }
}

impl StrategoConfig {
    pub fn move_pause(&self) -> Duration {
        Duration::from_millis(self.move_pause_ms)
    }

    pub fn capture_pause(&self) -> Duration {
        Duration::from_millis(self.capture_pause_ms)
    }
}

// ---------------------------------------------------------------------------
// Word Golf
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WordGolfConfig {
    /// Words dealt to each player at the start.
    pub words_per_player: usize,
    /// Failed attempts allowed on one word before it is skipped.
    pub max_attempts: usize,
    /// Optional word list, one word per line. Built-in list when unset.
    pub word_bank_path: Option<PathBuf>,
    pub read_timeout_ms: u64,
}

impl Default for WordGolfConfig {
    fn default() -> Self {
        Self {
            words_per_player: 5,
            max_attempts: 6,
            word_bank_path: None,
            read_timeout_ms: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// Secret Game
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretGameConfig {
    /// First number of the pre-race countdown.
    pub countdown_from: u32,
    pub countdown_interval_ms: u64,
    /// Simulation rate. 0 runs the loop as fast as possible.
    pub tick_rate_hz: u32,
    /// Time step of the very first tick.
    pub first_tick_ms: u64,
    /// Side length of one map tile, in pixels.
    pub tile_size: f32,
    /// Side length of a car's bounding box, in pixels.
    pub car_size: f32,
    /// Cruising speed, in pixels per second.
    pub speed: f32,
    /// Fraction of cruising speed kept while touching a wall.
    pub wall_speed_factor: f32,
    /// Steering rate, in radians per second.
    pub turn_rate: f32,
    /// Completed laps needed to win.
    pub laps_to_win: u32,
    /// Optional track file. Built-in track when unset.
    pub map_path: Option<PathBuf>,
}

impl Default for SecretGameConfig {
    fn default() -> Self {
        Self {
            countdown_from: 3,
            countdown_interval_ms: 1_000,
            tick_rate_hz: 60,
            first_tick_ms: 16,
            tile_size: 32.0,
            car_size: 20.0,
            speed: 160.0,
            wall_speed_factor: 0.35,
            turn_rate: 3.0,
            laps_to_win: 3,
            map_path: None,
        }
    }
}

impl SecretGameConfig {
    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }
}
