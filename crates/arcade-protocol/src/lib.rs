//! Wire protocol for Arcade.
//!
//! This crate defines the "language" that game clients and the server
//! speak:
//!
//! - **Types** ([`GameKind`], [`Color`], [`Seat`], [`BoardPos`], ...):
//!   the small values commands are built from.
//! - **Commands** ([`ClientCommand`], [`ServerCommand`]): closed enums
//!   with a text encoding of the form `<sigil><verb>:<field>:<field>`.
//! - **Framing** ([`CommandFramer`], [`Phase`]): turning a raw byte
//!   stream into complete, validated command strings.
//! - **Errors** ([`ProtocolError`]): what can go wrong, split into
//!   fatal framing errors and recoverable decode errors.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (players and matches). It doesn't know about connections or games. It
//! only knows how to cut a stream into commands and parse them.
//!
//! ```text
//! Transport (bytes) → CommandFramer (strings) → ClientCommand (typed)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod command;
mod error;
mod framer;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use command::{ClientCommand, GameStart, RacerStart, ServerCommand};
pub use error::ProtocolError;
pub use framer::{CommandFramer, MAX_PENDING_BYTES, Phase};
pub use types::{
    Alert, BoardPos, Color, EndReason, GameKind, INTENT_SIGIL,
    MAX_USERNAME_LEN, MoveResultKind, QUERY_SIGIL, Seat, TERMINATOR,
    TurnState, validate_username,
};
