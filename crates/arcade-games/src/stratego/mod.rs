//! Stratego: turn-based capture-the-flag on a 10×10 board.
//!
//! The first seat plays red and moves first. Every accepted move is
//! broadcast as `?move-result`, followed by a pause so clients can animate
//! it, and then by the next `?turn-info`. Capturing the flag ends the
//! match immediately; so does leaving the opponent without a legal move.

pub mod board;
pub mod piece;

use std::time::Duration;

use arcade_protocol::{ClientCommand, Color, GameKind, GameStart, Seat, ServerCommand};
use tracing::debug;

use crate::config::StrategoConfig;
use crate::engine::{GameEngine, Step};
use crate::result::{GameResult, Winner};

pub use board::{Board, Cell, IllegalMove, MoveOutcome};
pub use piece::{DECK_SIZE, Deck, Piece, Rank};

pub struct StrategoGame {
    usernames: [String; 2],
    board: Board,
    turn: Color,
    config: StrategoConfig,
    result: Option<GameResult>,
}

impl StrategoGame {
    /// `decks` are indexed by seat: the first seat's deck is red.
    pub fn new(usernames: [String; 2], decks: [Deck; 2], config: StrategoConfig) -> Self {
        let [red, blue] = &decks;
        Self {
            usernames,
            board: Board::setup(red, blue),
            turn: Color::Red,
            config,
            result: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    fn turn_info(&self) -> ServerCommand {
        ServerCommand::TurnInfo {
            turn: self.turn,
            board: self.board.serialize(),
        }
    }
}

impl GameEngine for StrategoGame {
    fn kind(&self) -> GameKind {
        GameKind::Stratego
    }

    fn start(&mut self) -> Vec<Step> {
        let mut steps: Vec<Step> = Seat::BOTH
            .iter()
            .map(|&seat| {
                Step::to_player(
                    seat,
                    ServerCommand::GameStart(GameStart::Stratego {
                        color: Color::for_seat(seat),
                        opponent: self.usernames[seat.other().index()].clone(),
                    }),
                )
            })
            .collect();
        steps.push(Step::to_all(self.turn_info()));
        steps
    }

    fn handle_command(&mut self, seat: Seat, cmd: ClientCommand) -> Vec<Step> {
        if self.result.is_some() {
            return Vec::new();
        }
        let ClientCommand::Move { from, to } = cmd else {
            debug!(?seat, verb = cmd.verb(), "ignoring non-move command");
            return Vec::new();
        };

        let color = Color::for_seat(seat);
        if color != self.turn {
            debug!(?seat, "move out of turn");
            return Vec::new();
        }
        if let Err(reason) = self.board.check_move(color, from, to) {
            debug!(?seat, %from, %to, %reason, "illegal move");
            return Vec::new();
        }

        let outcome = self.board.resolve(from, to);
        let mut steps = vec![Step::to_all(ServerCommand::MoveResult {
            kind: outcome.kind,
            from,
            to,
        })];

        if let Some(winner) = outcome.flag_captured_by {
            self.result = Some(GameResult::won_by(Winner::Color(winner)));
            return steps;
        }

        let pause = if outcome.kind.is_attack() {
            self.config.capture_pause()
        } else {
            self.config.move_pause()
        };
        steps.push(Step::Pause(pause));

        self.turn = self.turn.opponent();
        if !self.board.has_legal_move(self.turn) {
            debug!(stuck = %self.turn, "no legal moves left");
            self.result = Some(GameResult::won_by(Winner::Color(self.turn.opponent())));
            return steps;
        }

        steps.push(Step::to_all(self.turn_info()));
        steps
    }

    fn input_wait(&self) -> Duration {
        Duration::from_millis(self.config.read_timeout_ms)
    }

    fn result(&self) -> Option<GameResult> {
        self.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use arcade_protocol::{BoardPos, MoveResultKind};

    use super::*;

    fn game() -> StrategoGame {
        StrategoGame::new(
            ["alice".into(), "bob".into()],
            [Deck::standard(), Deck::standard()],
            StrategoConfig::default(),
        )
    }

    fn mv(r1: usize, c1: usize, r2: usize, c2: usize) -> ClientCommand {
        ClientCommand::Move {
            from: BoardPos::new(r1, c1),
            to: BoardPos::new(r2, c2),
        }
    }

    #[test]
    fn test_start_sends_colors_and_turn_info() {
        let mut game = game();
        let steps = game.start();
        assert_eq!(steps.len(), 3);
        assert_eq!(
            steps[0],
            Step::to_player(
                Seat::First,
                ServerCommand::GameStart(GameStart::Stratego {
                    color: Color::Red,
                    opponent: "bob".into()
                })
            )
        );
        assert_eq!(
            steps[1],
            Step::to_player(
                Seat::Second,
                ServerCommand::GameStart(GameStart::Stratego {
                    color: Color::Blue,
                    opponent: "alice".into()
                })
            )
        );
        match &steps[2] {
            Step::Send(_, ServerCommand::TurnInfo { turn, board }) => {
                assert_eq!(*turn, Color::Red);
                assert_eq!(board.len(), 100);
            }
            other => panic!("expected turn info, got {other:?}"),
        }
    }

    #[test]
    fn test_handle_command_legal_move_broadcasts_and_passes_turn() {
        let mut game = game();
        let steps = game.handle_command(Seat::First, mv(6, 0, 5, 0));
        assert_eq!(
            steps[0],
            Step::to_all(ServerCommand::MoveResult {
                kind: MoveResultKind::Movement,
                from: BoardPos::new(6, 0),
                to: BoardPos::new(5, 0),
            })
        );
        assert_eq!(steps[1], Step::Pause(Duration::from_secs(1)));
        assert!(matches!(
            steps[2],
            Step::Send(_, ServerCommand::TurnInfo { turn: Color::Blue, .. })
        ));
        assert_eq!(game.turn(), Color::Blue);
    }

    #[test]
    fn test_handle_command_out_of_turn_is_ignored() {
        let mut game = game();
        assert!(game.handle_command(Seat::Second, mv(3, 0, 4, 0)).is_empty());
        assert_eq!(game.turn(), Color::Red);
    }

    #[test]
    fn test_handle_command_illegal_move_is_ignored() {
        let mut game = game();
        let before = game.board().clone();
        assert!(game.handle_command(Seat::First, mv(6, 0, 4, 0)).is_empty());
        assert!(game.handle_command(Seat::First, mv(9, 0, 8, 0)).is_empty());
        assert_eq!(game.board(), &before);
        assert_eq!(game.turn(), Color::Red);
    }

    #[test]
    fn test_handle_command_attack_uses_capture_pause() {
        let mut game = game();
        // March the red miner at (6,0) into blue's front-line scout at (3,0).
        game.handle_command(Seat::First, mv(6, 0, 5, 0));
        game.handle_command(Seat::Second, mv(3, 1, 4, 1));
        game.handle_command(Seat::First, mv(5, 0, 4, 0));
        game.handle_command(Seat::Second, mv(4, 1, 5, 1));
        let steps = game.handle_command(Seat::First, mv(4, 0, 3, 0));
        match &steps[0] {
            Step::Send(_, ServerCommand::MoveResult { kind, .. }) => assert!(kind.is_attack()),
            other => panic!("expected move result, got {other:?}"),
        }
        assert_eq!(steps[1], Step::Pause(Duration::from_secs(5)));
    }

    #[test]
    fn test_handle_command_flag_capture_ends_match() {
        let mut board = Board::empty();
        board.set(BoardPos::new(1, 0), Cell::Piece(Piece::new(Color::Red, Rank::Scout)));
        board.set(BoardPos::new(0, 0), Cell::Piece(Piece::new(Color::Blue, Rank::Flag)));
        board.set(BoardPos::new(0, 9), Cell::Piece(Piece::new(Color::Blue, Rank::Scout)));
        let mut game = game();
        game.board = board;

        let steps = game.handle_command(Seat::First, mv(1, 0, 0, 0));
        assert_eq!(steps.len(), 1);
        assert_eq!(game.result(), Some(GameResult::won_by(Winner::Color(Color::Red))));
        // Nothing is accepted once the match is decided.
        assert!(game.handle_command(Seat::Second, mv(0, 9, 0, 8)).is_empty());
    }

    #[test]
    fn test_handle_command_opponent_without_moves_loses() {
        let mut board = Board::empty();
        board.set(BoardPos::new(9, 0), Cell::Piece(Piece::new(Color::Red, Rank::Scout)));
        board.set(BoardPos::new(0, 0), Cell::Piece(Piece::new(Color::Blue, Rank::Flag)));
        board.set(BoardPos::new(0, 1), Cell::Piece(Piece::new(Color::Blue, Rank::Bomb)));
        board.set(BoardPos::new(1, 0), Cell::Piece(Piece::new(Color::Blue, Rank::Bomb)));
        let mut game = game();
        game.board = board;

        let steps = game.handle_command(Seat::First, mv(9, 0, 9, 5));
        assert_eq!(steps.len(), 2);
        assert_eq!(game.result(), Some(GameResult::won_by(Winner::Color(Color::Red))));
    }
}
