//! Player links and matchmaking for Arcade.
//!
//! This crate handles everything between "a client connected" and "a
//! match starts":
//!
//! 1. **Links**: a connection plus its reassembly buffer, reading typed
//!    commands with a bounded wait ([`PlayerLink`])
//! 2. **Matchmaking**: one FIFO queue per game kind that pairs waiting
//!    players and assigns seats ([`MatchmakingQueue`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Games Layer (above)  ← receives paired players, runs the match
//!     ↕
//! Session Layer (this crate)  ← framed links, queues, seat assignment
//!     ↕
//! Protocol Layer (below)  ← commands, framing, GameKind, Seat
//! ```

mod error;
mod link;
mod queue;

pub use error::SessionError;
pub use link::{Inbound, PlayerLink};
pub use queue::{
    Assembled, MatchmakingQueue, Matched, Pairing, Ticket, TicketId,
};
