//! Integration tests for the session driver.
//!
//! Each test runs a real match over in-memory connection pairs: the
//! server ends are wrapped in `PlayerLink`s and handed to `run_session`,
//! while the test plays both clients through the other ends.

use std::sync::Arc;

use arcade_games::secret_game::TrackMap;
use arcade_games::stratego::Deck;
use arcade_games::{
    GameEngine, GameResult, SecretGame, SecretGameConfig, StrategoConfig, StrategoGame,
    Winner, WordGolfConfig, WordGolfGame, run_session,
};
use arcade_protocol::Phase;
use arcade_session::PlayerLink;
use arcade_transport::{Connection, MemoryConnection, memory_pair};
use tokio::task::JoinHandle;

// =========================================================================
// Helpers
// =========================================================================

/// The client end of a connection, reading whole frames.
struct Client {
    conn: MemoryConnection,
    pending: String,
}

impl Client {
    async fn send(&self, text: &str) {
        self.conn.send(text.as_bytes()).await.expect("client send");
    }

    /// The next frame without its terminator, or `None` once the server
    /// has closed the connection.
    async fn next(&mut self) -> Option<String> {
        loop {
            if let Some(at) = self.pending.find('\\') {
                let frame = self.pending[..at].to_string();
                self.pending.drain(..=at);
                return Some(frame);
            }
            let bytes = self.conn.recv().await.expect("client recv")?;
            self.pending.push_str(&String::from_utf8(bytes).expect("utf-8"));
        }
    }

    /// Frames up to and including the first one starting with `prefix`.
    async fn until(&mut self, prefix: &str) -> Vec<String> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next().await {
            let done = frame.starts_with(prefix);
            frames.push(frame);
            if done {
                return frames;
            }
        }
        panic!("connection closed before '{prefix}', got {frames:?}");
    }

    /// Everything until the server closes the connection.
    async fn rest(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next().await {
            frames.push(frame);
        }
        frames
    }
}

/// Starts `engine` on a fresh pair of links and returns the two clients.
fn start<E>(mut engine: E) -> (JoinHandle<GameResult>, Client, Client)
where
    E: GameEngine,
{
    let (server_a, client_a) = memory_pair();
    let (server_b, client_b) = memory_pair();
    let session = tokio::spawn(async move {
        let mut links = [
            PlayerLink::new(server_a, Phase::Lobby),
            PlayerLink::new(server_b, Phase::Lobby),
        ];
        run_session(&mut engine, &mut links).await
    });
    let client = |conn| Client {
        conn,
        pending: String::new(),
    };
    (session, client(client_a), client(client_b))
}

fn names() -> [String; 2] {
    ["alice".into(), "bob".into()]
}

// =========================================================================
// Word Golf
// =========================================================================

#[tokio::test]
async fn test_word_golf_match_lower_score_wins() {
    let game = WordGolfGame::new(
        names(),
        [vec!["HONEY".into()], vec!["PIANO".into()]],
        WordGolfConfig::default(),
    );
    let (session, mut alice, mut bob) = start(game);

    let opening = alice.until("?update").await;
    assert_eq!(opening, ["?game-start:word_golf:bob", "?update:0:1:0:1"]);
    let opening = bob.until("?update").await;
    assert_eq!(opening, ["?game-start:word_golf:alice", "?update:0:1:0:1"]);

    bob.send("!guess:crane\\").await;
    let frames = bob.until("?update").await;
    assert_eq!(frames[0], "?feedback-history:XCXRXAONXE");
    assert_eq!(frames[1], "?stashed-words:");
    assert_eq!(frames[2], "?update:1:1:0:1");

    alice.send("!guess:honey\\").await;
    let frames = alice.rest().await;
    assert!(frames.contains(&"?stashed-words:HONEY".to_string()));
    assert_eq!(
        frames.last().map(String::as_str),
        Some("?game-over:word_golf:winner-determined:alice")
    );
    let frames = bob.rest().await;
    assert_eq!(
        frames.last().map(String::as_str),
        Some("?game-over:word_golf:winner-determined:alice")
    );

    let result = session.await.unwrap();
    assert_eq!(result, GameResult::won_by(Winner::Username("alice".into())));
}

#[tokio::test]
async fn test_word_golf_unknown_command_is_ignored() {
    let game = WordGolfGame::new(
        names(),
        [vec!["HONEY".into()], vec!["PIANO".into()]],
        WordGolfConfig::default(),
    );
    let (session, mut alice, bob) = start(game);
    alice.until("?update").await;

    alice.send("!dance:now\\!guess:linen\\").await;
    let frames = alice.until("?feedback-history").await;
    assert_eq!(frames.last().map(String::as_str), Some("?feedback-history:XLXIONOEXN"));

    drop(bob);
    let frames = alice.rest().await;
    assert_eq!(frames.last().map(String::as_str), Some("?game-over:word_golf:abrupt-end"));
    assert_eq!(session.await.unwrap(), GameResult::abrupt());
}

// =========================================================================
// Stratego
// =========================================================================

fn quick_stratego() -> StrategoGame {
    let config = StrategoConfig {
        move_pause_ms: 0,
        capture_pause_ms: 0,
        ..StrategoConfig::default()
    };
    StrategoGame::new(names(), [Deck::standard(), Deck::standard()], config)
}

#[tokio::test]
async fn test_stratego_move_is_broadcast_to_both() {
    let (session, mut alice, mut bob) = start(quick_stratego());

    let opening = alice.until("?turn-info").await;
    assert_eq!(opening[0], "?game-start:stratego:r:bob");
    assert!(opening[1].starts_with("?turn-info:r:"));
    let opening = bob.until("?turn-info").await;
    assert_eq!(opening[0], "?game-start:stratego:b:alice");

    alice.send("!move:6:0:5:0\\").await;

    for client in [&mut alice, &mut bob] {
        let frames = client.until("?turn-info").await;
        assert_eq!(frames[0], "?move-result:movement:6:0:5:0");
        assert!(frames[1].starts_with("?turn-info:b:"));
    }

    drop(alice);
    drop(bob);
    assert_eq!(session.await.unwrap(), GameResult::abrupt());
}

#[tokio::test]
async fn test_stratego_disconnect_ends_abruptly() {
    let (session, mut alice, bob) = start(quick_stratego());
    alice.until("?turn-info").await;

    drop(bob);
    let frames = alice.rest().await;
    assert_eq!(frames.last().map(String::as_str), Some("?game-over:stratego:abrupt-end"));
    assert_eq!(session.await.unwrap(), GameResult::abrupt());
}

#[tokio::test]
async fn test_stratego_missing_sigil_is_fatal() {
    let (session, mut alice, mut bob) = start(quick_stratego());
    alice.until("?turn-info").await;

    alice.send("move:6:0:5:0\\").await;
    let frames = bob.rest().await;
    assert_eq!(frames.last().map(String::as_str), Some("?game-over:stratego:abrupt-end"));
    assert_eq!(session.await.unwrap(), GameResult::abrupt());
}

// =========================================================================
// Secret Game
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_secret_game_race_first_lap_wins() {
    let config = SecretGameConfig {
        laps_to_win: 1,
        ..SecretGameConfig::default()
    };
    let map = TrackMap::parse("########\n#1 ABL #\n#      #\n#2     #\n########", 32.0).unwrap();
    let game = SecretGame::new(names(), Arc::new(map), config);
    let (session, mut alice, mut bob) = start(game);

    let frames = alice.rest().await;
    assert_eq!(frames[0], "?game-start:secret_game:0:alice:48:48:bob:48:112");
    assert_eq!(&frames[1..5], ["?countdown:3", "?countdown:2", "?countdown:1", "?race-start"]);
    assert_eq!(frames[5], "?pos:0:51:48");
    assert!(frames.contains(&"?lap-completion:0:1".to_string()));
    assert!(!frames.iter().any(|f| f.starts_with("?lap-completion:1")));
    assert_eq!(
        frames.last().map(String::as_str),
        Some("?game-over:secret_game:winner-determined:0")
    );

    let frames = bob.rest().await;
    assert_eq!(frames[0], "?game-start:secret_game:1:alice:48:48:bob:48:112");
    assert_eq!(
        session.await.unwrap(),
        GameResult::won_by(Winner::Index(0))
    );
}

#[tokio::test(start_paused = true)]
async fn test_secret_game_steering_changes_broadcast_angle() {
    let config = SecretGameConfig {
        countdown_from: 0,
        ..SecretGameConfig::default()
    };
    let map = TrackMap::builtin(config.tile_size).unwrap();
    let game = SecretGame::new(names(), Arc::new(map), config);
    let (session, mut alice, bob) = start(game);

    alice.until("?race-start").await;
    alice.send("!car-turn:right\\").await;

    let mut turned = false;
    for _ in 0..200 {
        let frame = alice.next().await.expect("race still running");
        if let Some(angle) = frame.strip_prefix("?angle:0:") {
            if angle.parse::<f32>().unwrap() > 0.0 {
                turned = true;
                break;
            }
        }
    }
    assert!(turned);

    drop(bob);
    let frames = alice.rest().await;
    assert_eq!(frames.last().map(String::as_str), Some("?game-over:secret_game:abrupt-end"));
    assert_eq!(session.await.unwrap(), GameResult::abrupt());
}
