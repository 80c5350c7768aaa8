//! `ArcadeServer` builder, accept loop, and per-kind dispatchers.
//!
//! ```text
//! accept ──▶ handler task ──▶ MatchmakingQueue(kind) ──▶ Pairing ──▶ dispatcher(kind)
//!                                                                        │
//!                                                         assemble + delay + play_match
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use arcade_games::{GameAssets, GameResult, Player, play_match};
use arcade_protocol::GameKind;
use arcade_session::{Assembled, MatchmakingQueue, Pairing};
use arcade_transport::{ShutdownHandle, TcpConnection, TcpTransport, Transport};
use tokio::sync::mpsc;

use crate::ArcadeError;
use crate::config::ServerConfig;
use crate::handler::handle_connection;

/// A player waiting for, or seated in, a match over TCP.
pub(crate) type TcpPlayer = Player<TcpConnection>;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) config: ServerConfig,
    pub(crate) assets: GameAssets,
    /// One queue per enabled game kind.
    pub(crate) queues: HashMap<GameKind, Arc<MatchmakingQueue<TcpPlayer>>>,
}

impl ServerState {
    pub(crate) fn queue(&self, kind: GameKind) -> Option<&Arc<MatchmakingQueue<TcpPlayer>>> {
        self.queues.get(&kind)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring and starting an Arcade server.
///
/// # Example
///
/// ```rust,ignore
/// use arcade::prelude::*;
///
/// let server = ArcadeServerBuilder::new()
///     .config(config)
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ArcadeServerBuilder {
    bind_addr: Option<String>,
    config: ServerConfig,
}

impl ArcadeServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: None,
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind to, overriding `config.bind`.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = Some(addr.to_string());
        self
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the game assets, binds the listener, and starts one
    /// matchmaking dispatcher per enabled game.
    pub async fn build(self) -> Result<ArcadeServer, ArcadeError> {
        let mut config = self.config;
        if let Some(addr) = self.bind_addr {
            config.bind = addr;
        }

        let assets = GameAssets::load(&config.games).await?;
        let transport = TcpTransport::bind(&config.bind).await?;

        let mut queues = HashMap::new();
        let mut receivers = Vec::new();
        for &kind in &config.enabled_games {
            if queues.contains_key(&kind) {
                continue;
            }
            let (queue, pairings) = MatchmakingQueue::new(kind);
            queues.insert(kind, Arc::new(queue));
            receivers.push(pairings);
        }

        let state = Arc::new(ServerState {
            config,
            assets,
            queues,
        });
        for pairings in receivers {
            tokio::spawn(dispatch(pairings, Arc::clone(&state)));
        }

        Ok(ArcadeServer { transport, state })
    }
}

impl Default for ArcadeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A bound Arcade server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ArcadeServer {
    transport: TcpTransport,
    state: Arc<ServerState>,
}

impl ArcadeServer {
    /// Creates a new builder.
    pub fn builder() -> ArcadeServerBuilder {
        ArcadeServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// A handle that stops [`run`](Self::run) from another task. Matches
    /// already running are not interrupted.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.transport.shutdown_handle()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    ///
    /// Returns only once the transport is shut down.
    pub async fn run(mut self) -> Result<(), ArcadeError> {
        let games: Vec<&str> = self.state.queues.keys().map(|kind| kind.as_str()).collect();
        tracing::info!(?games, "Arcade server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(arcade_transport::TransportError::Shutdown) => {
                    tracing::info!("Arcade server stopped accepting connections");
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Receives pairings for one game kind and starts a match for each.
async fn dispatch(mut pairings: mpsc::UnboundedReceiver<Pairing<TcpPlayer>>, state: Arc<ServerState>) {
    while let Some(pairing) = pairings.recv().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move { start_match(pairing, &state).await });
    }
}

async fn start_match(pairing: Pairing<TcpPlayer>, state: &ServerState) {
    let kind = pairing.kind;
    let [first, second] = pairing.usernames.clone();

    match pairing.assemble().await {
        Assembled::Both(players) => {
            tokio::time::sleep(state.config.pairing_delay()).await;
            play_match(kind, players, &state.config.games, &state.assets).await;
        }
        Assembled::Partial(seat, player) => {
            tracing::info!(%kind, %first, %second, ?seat, "opponent left before the match started");
            let game_over = GameResult::abrupt().game_over(kind);
            if let Err(e) = player.link.send(&game_over).await {
                tracing::debug!(error = %e, "could not deliver game over");
            }
            player.link.close().await;
        }
        Assembled::Empty => {
            tracing::debug!(%kind, %first, %second, "both players left before the match started");
        }
    }
}
