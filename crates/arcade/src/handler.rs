//! Per-connection handler: declaration, matchmaking, hand-over.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Read a `?game:<kind>:<username>[:...]` declaration
//!   2. Validate the name, the game kind, and any loadout
//!   3. Enqueue in that kind's matchmaking queue
//!   4. Watch the connection until paired, cancelling on disconnect
//!   5. Hand the connection over to the pairing and exit
//!
//! From step 5 on, the match task owns the connection.

use std::sync::Arc;
use std::time::Duration;

use arcade_games::{Loadout, Player};
use arcade_protocol::{ClientCommand, GameKind, Phase, validate_username};
use arcade_session::{Inbound, Matched, PlayerLink, SessionError};
use arcade_transport::{Connection, TcpConnection};
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::ArcadeError;
use crate::server::{ServerState, TcpPlayer};

/// How long one lobby read waits before checking the ticket again.
const LOBBY_POLL: Duration = Duration::from_secs(1);

/// A valid declaration.
struct Declaration {
    kind: GameKind,
    username: String,
    loadout: Loadout,
}

enum Waiting {
    Matched(Result<Matched<TcpPlayer>, oneshot::error::RecvError>),
    Input(Result<Inbound, SessionError>),
}

/// Handles a single connection from accept to hand-over.
pub(crate) async fn handle_connection(
    conn: TcpConnection,
    state: Arc<ServerState>,
) -> Result<(), ArcadeError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");
    let mut link = PlayerLink::new(conn, Phase::Lobby);

    // --- Step 1: Declaration ---
    let declaration = match read_declaration(&mut link, &state).await {
        Ok(Some(declaration)) => declaration,
        Ok(None) => {
            link.close().await;
            return Ok(());
        }
        Err(e) => {
            link.close().await;
            return Err(e);
        }
    };
    let Declaration {
        kind,
        username,
        loadout,
    } = declaration;

    let Some(queue) = state.queue(kind) else {
        tracing::info!(%conn_id, %kind, "game is not enabled");
        link.close().await;
        return Ok(());
    };

    // --- Step 2: Wait for an opponent ---
    let mut ticket = queue.enqueue(&username).await?;
    tracing::info!(%conn_id, player = %username, %kind, ticket = %ticket.id(), "waiting for opponent");

    let matched = loop {
        let event = tokio::select! {
            matched = ticket.matched() => Waiting::Matched(matched),
            input = link.poll(LOBBY_POLL) => Waiting::Input(input),
        };
        match event {
            Waiting::Matched(Ok(matched)) => break matched,
            Waiting::Matched(Err(_)) => {
                link.close().await;
                return Err(SessionError::QueueClosed(kind).into());
            }
            Waiting::Input(Ok(Inbound::Idle)) => {}
            Waiting::Input(Ok(Inbound::Commands(commands))) => {
                for cmd in commands {
                    tracing::debug!(%conn_id, verb = cmd.verb(), "ignoring command while waiting");
                }
            }
            Waiting::Input(Err(e)) => {
                let cancelled = queue.cancel(ticket.id()).await;
                tracing::info!(%conn_id, player = %username, %kind, cancelled, "left the queue");
                link.close().await;
                return Err(e.into());
            }
        }
    };

    // --- Step 3: Hand-over ---
    tracing::debug!(%conn_id, player = %username, seat = ?matched.seat, opponent = %matched.opponent, "paired");
    if let Err(player) = matched.take_seat(Player::new(link, username, loadout)) {
        tracing::debug!(%conn_id, "pairing was abandoned");
        player.link.close().await;
    }
    Ok(())
}

/// Reads until a declaration arrives or the declaration timeout passes.
///
/// Returns `None` for a connection that should simply be closed: no
/// declaration in time, an invalid username, or an invalid loadout.
async fn read_declaration(
    link: &mut PlayerLink<TcpConnection>,
    state: &ServerState,
) -> Result<Option<Declaration>, ArcadeError> {
    let conn_id = link.id();
    let deadline = Instant::now() + state.config.declaration_timeout();

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            tracing::info!(%conn_id, "no declaration before the timeout");
            return Ok(None);
        }

        let Inbound::Commands(commands) = link.poll(remaining).await? else {
            continue;
        };
        let Some(ClientCommand::Declare {
            kind,
            username,
            extra,
        }) = commands.into_iter().next()
        else {
            continue;
        };

        if let Err(e) = validate_username(&username) {
            tracing::warn!(%conn_id, error = %e, "rejecting declaration");
            return Ok(None);
        }
        return match Loadout::parse(kind, &extra) {
            Ok(loadout) => Ok(Some(Declaration {
                kind,
                username,
                loadout,
            })),
            Err(e) => {
                tracing::warn!(%conn_id, player = %username, %kind, error = %e, "rejecting declaration");
                Ok(None)
            }
        };
    }
}
