//! The `GameEngine` trait: the seam between rules and I/O.
//!
//! Each game is a plain, synchronous state machine. It never touches a
//! socket. It receives commands from a seat, and answers with a list of
//! [`Step`]s: messages to deliver and pauses to observe. The session
//! driver (see [`crate::driver`]) owns the connections and carries the
//! steps out in order.
//!
//! Keeping engines free of I/O is what makes them testable without a
//! network: a test feeds commands and inspects the returned steps.

use std::time::Duration;

use arcade_protocol::{ClientCommand, GameKind, Seat, ServerCommand};
use arcade_tick::TickConfig;

use crate::GameResult;

/// Who a message is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Both players.
    All,
    /// One player.
    Player(Seat),
    /// Everyone except the given player.
    AllExcept(Seat),
}

impl Recipient {
    /// Returns `true` if `seat` should receive the message.
    pub fn includes(self, seat: Seat) -> bool {
        match self {
            Self::All => true,
            Self::Player(target) => target == seat,
            Self::AllExcept(excluded) => excluded != seat,
        }
    }
}

/// One thing the driver must do on an engine's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Deliver a command.
    Send(Recipient, ServerCommand),
    /// Wait before carrying out the following steps.
    Pause(Duration),
}

impl Step {
    pub fn to_all(cmd: ServerCommand) -> Self {
        Self::Send(Recipient::All, cmd)
    }

    pub fn to_player(seat: Seat, cmd: ServerCommand) -> Self {
        Self::Send(Recipient::Player(seat), cmd)
    }
}

/// The rules of one two-player game.
///
/// The driver calls `start` once, then routes every decoded command
/// through `handle_command`. Real-time games also return a
/// [`TickConfig`] from `tick_config`, and the driver calls `tick` with
/// the measured time step. After every call the driver checks `result`;
/// the first `Some` ends the match.
pub trait GameEngine: Send + 'static {
    /// Which game this is. Used for the `?game-over` message.
    fn kind(&self) -> GameKind;

    /// Opening messages: `?game-start` and the initial state.
    fn start(&mut self) -> Vec<Step>;

    /// Processes one command from a seat.
    ///
    /// Illegal or out-of-turn commands produce no steps and no state
    /// change.
    fn handle_command(&mut self, seat: Seat, cmd: ClientCommand) -> Vec<Step>;

    /// Advances a real-time game by `dt`. Default: no-op.
    fn tick(&mut self, _dt: Duration) -> Vec<Step> {
        Vec::new()
    }

    /// `Some` for real-time games that need a tick loop. Default: `None`
    /// (event-driven).
    fn tick_config(&self) -> Option<TickConfig> {
        None
    }

    /// How long to wait on one player's connection before moving on to
    /// the other. Only used by event-driven games.
    fn input_wait(&self) -> Duration {
        Duration::from_millis(50)
    }

    /// The outcome, once the game is over.
    fn result(&self) -> Option<GameResult>;
}
