//! The session driver: runs one match between two connected players.
//!
//! The driver owns both [`PlayerLink`]s and one [`GameEngine`]. It feeds
//! the engine every command that arrives and carries out the [`Step`]s
//! the engine returns. There are two loop shapes:
//!
//! - **Event-driven** (Stratego, Word Golf): the driver alternates between
//!   the two links, waiting at most `input_wait` on each, and hands every
//!   command to the engine as it arrives.
//! - **Real-time** (the racing game): a [`TickScheduler`] paces the loop.
//!   Each tick the driver drains whatever input is already waiting, then
//!   advances the engine by the measured `dt`.
//!
//! Whatever happens, the match ends with exactly one [`GameResult`], which
//! is broadcast as `?game-over` to both players before the links close.
//! A lost connection or a protocol violation becomes an abrupt end.

use std::sync::Arc;

use arcade_protocol::{GameKind, Phase, Seat};
use arcade_session::{Inbound, PlayerLink, SessionError};
use arcade_tick::{TickConfig, TickScheduler};
use arcade_transport::Connection;

use crate::config::GamesConfig;
use crate::engine::{GameEngine, Step};
use crate::secret_game::{SecretGame, TrackMap};
use crate::stratego::{Deck, StrategoGame};
use crate::word_golf::{WordBank, WordGolfGame};
use crate::{GameError, GameResult};

/// Upper bound on reads per seat per tick, so a flooding client cannot
/// stall the simulation.
const MAX_READS_PER_TICK: usize = 8;

// ---------------------------------------------------------------------------
// Players and loadouts
// ---------------------------------------------------------------------------

/// What a player brought to the match in their declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loadout {
    None,
    /// A Stratego starting deck.
    Deck(Deck),
}

impl Loadout {
    /// Validates the extra declaration fields for `kind`.
    ///
    /// # Errors
    /// A Stratego declaration without a valid 40-cell deck. The other
    /// games take no extra fields and ignore any that are sent.
    pub fn parse(kind: GameKind, extra: &[String]) -> Result<Self, GameError> {
        match kind {
            GameKind::Stratego => Deck::parse(extra).map(Self::Deck),
            GameKind::WordGolf | GameKind::SecretGame => Ok(Self::None),
        }
    }
}

/// A player who has declared a game and is ready to be seated.
pub struct Player<C: Connection> {
    pub link: PlayerLink<C>,
    pub username: String,
    pub loadout: Loadout,
}

impl<C: Connection> Player<C> {
    pub fn new(link: PlayerLink<C>, username: impl Into<String>, loadout: Loadout) -> Self {
        Self {
            link,
            username: username.into(),
            loadout,
        }
    }
}

/// Shared, read-only game data loaded once at startup.
#[derive(Debug, Clone)]
pub struct GameAssets {
    pub words: Arc<WordBank>,
    pub track: Arc<TrackMap>,
}

impl GameAssets {
    /// Loads the configured word list and track, falling back to the
    /// built-in ones where no file is configured.
    pub async fn load(config: &GamesConfig) -> Result<Self, GameError> {
        let words = match &config.word_golf.word_bank_path {
            Some(path) => WordBank::load(path).await?,
            None => WordBank::builtin(),
        };
        let tile_size = config.secret_game.tile_size;
        let track = match &config.secret_game.map_path {
            Some(path) => TrackMap::load(path, tile_size).await?,
            None => TrackMap::builtin(tile_size)?,
        };
        tracing::info!(words = words.len(), "game assets loaded");
        Ok(Self {
            words: Arc::new(words),
            track: Arc::new(track),
        })
    }

    /// The built-in word list and track.
    pub fn builtin(config: &GamesConfig) -> Result<Self, GameError> {
        Ok(Self {
            words: Arc::new(WordBank::builtin()),
            track: Arc::new(TrackMap::builtin(config.secret_game.tile_size)?),
        })
    }
}

// ---------------------------------------------------------------------------
// Match entry point
// ---------------------------------------------------------------------------

/// Builds the engine for `kind` from the two players' declarations.
///
/// A Stratego player without a deck gets the standard deck.
pub fn build_engine(
    kind: GameKind,
    usernames: [String; 2],
    loadouts: [Loadout; 2],
    config: &GamesConfig,
    assets: &GameAssets,
) -> Box<dyn GameEngine> {
    match kind {
        GameKind::Stratego => {
            let decks = loadouts.map(|loadout| match loadout {
                Loadout::Deck(deck) => deck,
                Loadout::None => Deck::standard(),
            });
            Box::new(StrategoGame::new(usernames, decks, config.stratego.clone()))
        }
        GameKind::WordGolf => {
            let queues = assets
                .words
                .sample_disjoint(&mut rand::rng(), config.word_golf.words_per_player);
            Box::new(WordGolfGame::new(usernames, queues, config.word_golf.clone()))
        }
        GameKind::SecretGame => Box::new(SecretGame::new(
            usernames,
            Arc::clone(&assets.track),
            config.secret_game.clone(),
        )),
    }
}

/// Runs a full match between two seated players and returns its result.
///
/// `players` are indexed by seat.
pub async fn play_match<C: Connection>(
    kind: GameKind,
    players: [Player<C>; 2],
    config: &GamesConfig,
    assets: &GameAssets,
) -> GameResult {
    let [first, second] = players;
    let usernames = [first.username, second.username];
    tracing::info!(%kind, first = %usernames[0], second = %usernames[1], "match starting");

    let mut engine = build_engine(
        kind,
        usernames,
        [first.loadout, second.loadout],
        config,
        assets,
    );
    let mut links = [first.link, second.link];
    run_session(engine.as_mut(), &mut links).await
}

// ---------------------------------------------------------------------------
// Session loop
// ---------------------------------------------------------------------------

/// Drives `engine` over `links` until it produces a result or a link
/// fails, then broadcasts `?game-over` and closes both links.
pub async fn run_session<C: Connection>(
    engine: &mut dyn GameEngine,
    links: &mut [PlayerLink<C>; 2],
) -> GameResult {
    let kind = engine.kind();
    for link in links.iter_mut() {
        link.set_phase(Phase::for_game(kind));
    }

    let result = match drive(engine, links).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(%kind, error = %e, "match ended abruptly");
            GameResult::abrupt()
        }
    };

    let game_over = result.game_over(kind);
    for link in links.iter() {
        if let Err(e) = link.send(&game_over).await {
            tracing::debug!(id = %link.id(), error = %e, "could not deliver game over");
        }
        link.close().await;
    }

    tracing::info!(%kind, reason = result.reason().as_str(), "match finished");
    result
}

async fn drive<C: Connection>(
    engine: &mut dyn GameEngine,
    links: &mut [PlayerLink<C>; 2],
) -> Result<GameResult, SessionError> {
    deliver(links, engine.start()).await?;
    if let Some(result) = engine.result() {
        return Ok(result);
    }

    match engine.tick_config() {
        Some(config) => run_real_time(engine, links, config).await,
        None => run_event_driven(engine, links).await,
    }
}

async fn run_event_driven<C: Connection>(
    engine: &mut dyn GameEngine,
    links: &mut [PlayerLink<C>; 2],
) -> Result<GameResult, SessionError> {
    let wait = engine.input_wait();
    loop {
        for seat in Seat::BOTH {
            let Inbound::Commands(commands) = links[seat.index()].poll(wait).await? else {
                continue;
            };
            for cmd in commands {
                let steps = engine.handle_command(seat, cmd);
                deliver(links, steps).await?;
                if let Some(result) = engine.result() {
                    return Ok(result);
                }
            }
        }
    }
}

async fn run_real_time<C: Connection>(
    engine: &mut dyn GameEngine,
    links: &mut [PlayerLink<C>; 2],
    config: TickConfig,
) -> Result<GameResult, SessionError> {
    let wait = engine.input_wait();
    let mut scheduler = TickScheduler::new(config);

    loop {
        let tick = scheduler.wait_for_tick().await;

        for seat in Seat::BOTH {
            for _ in 0..MAX_READS_PER_TICK {
                let Inbound::Commands(commands) = links[seat.index()].poll(wait).await? else {
                    break;
                };
                for cmd in commands {
                    let steps = engine.handle_command(seat, cmd);
                    deliver(links, steps).await?;
                }
            }
        }

        let steps = engine.tick(tick.dt);
        deliver(links, steps).await?;
        scheduler.record_tick_end();

        if let Some(result) = engine.result() {
            tracing::debug!(ticks = scheduler.tick_count(), "race over");
            return Ok(result);
        }
    }
}

/// Carries out steps in order: sends go to every matching seat, pauses
/// hold everything after them.
async fn deliver<C: Connection>(
    links: &[PlayerLink<C>; 2],
    steps: Vec<Step>,
) -> Result<(), SessionError> {
    for step in steps {
        match step {
            Step::Send(to, cmd) => {
                for seat in Seat::BOTH {
                    if to.includes(seat) {
                        links[seat.index()].send(&cmd).await?;
                    }
                }
            }
            Step::Pause(duration) => tokio::time::sleep(duration).await,
        }
    }
    Ok(())
}
