//! Game rules and match orchestration for Arcade.
//!
//! Each game is a synchronous state machine implementing [`GameEngine`].
//! The [`driver`] runs one engine against two live connections, and every
//! match ends with a [`GameResult`] broadcast as `?game-over`.
//!
//! # Key types
//!
//! - [`GameEngine`]: the trait every game implements
//! - [`StrategoGame`], [`WordGolfGame`], [`SecretGame`]: the three games
//! - [`play_match`]: seats two players and runs a match to completion
//! - [`GamesConfig`]: per-game settings
//! - [`GameResult`]: the uniform outcome

mod config;
pub mod driver;
mod engine;
mod error;
mod result;
pub mod secret_game;
pub mod stratego;
pub mod word_golf;

pub use config::{GamesConfig, SecretGameConfig, StrategoConfig, WordGolfConfig};
pub use driver::{GameAssets, Loadout, Player, build_engine, play_match, run_session};
pub use engine::{GameEngine, Recipient, Step};
pub use error::GameError;
pub use result::{GameResult, Winner};
pub use secret_game::SecretGame;
pub use stratego::StrategoGame;
pub use word_golf::WordGolfGame;
