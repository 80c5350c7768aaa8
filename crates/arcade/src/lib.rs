//! # Arcade
//!
//! A matchmaking game server for two-player games over plain TCP.
//!
//! Clients connect, declare which game they want with
//! `?game:<kind>:<username>\`, and wait. Each game kind has its own
//! first-come, first-served queue; as soon as two players are waiting they
//! are paired, seated, and a match of that game runs until it produces a
//! result.
//!
//! Three games ship with the server: Stratego, Word Golf, and a real-time
//! top-down racer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arcade::prelude::*;
//!
//! # async fn start() -> Result<(), ArcadeError> {
//! let server = ArcadeServerBuilder::new()
//!     .bind("127.0.0.1:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{DEFAULT_BIND, ServerConfig};
pub use error::ArcadeError;
pub use server::{ArcadeServer, ArcadeServerBuilder};

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{ArcadeError, ArcadeServer, ArcadeServerBuilder, ServerConfig};
    pub use arcade_games::{
        GameResult, GamesConfig, SecretGameConfig, StrategoConfig, Winner, WordGolfConfig,
    };
    pub use arcade_protocol::GameKind;
}
