//! Word Golf: a concurrent word-guessing duel.
//!
//! Both players work through their own queue of hidden words at the same
//! time. Every guess earns feedback; scores work like golf, so fewer points
//! is better:
//!
//! | Event                                 | Points        |
//! |---------------------------------------|---------------|
//! | wrong guess                           | +1            |
//! | last allowed attempt also wrong       | +3 (not +1)   |
//! | correct guess                         | −5, min 0     |
//! | first to empty their queue            | −5, min 0     |
//!
//! A word solved for the first time in the match goes to the solver's
//! stash. Stashed words can be pushed onto the opponent's queue, which is
//! the only way the players interact.

pub mod feedback;
pub mod words;

use std::collections::HashSet;
use std::time::Duration;

use arcade_protocol::{Alert, ClientCommand, GameKind, GameStart, Seat, ServerCommand};
use tracing::debug;

use crate::config::WordGolfConfig;
use crate::engine::{GameEngine, Step};
use crate::result::{GameResult, Winner};

pub use feedback::{Mark, feedback, history_entry};
pub use words::WordBank;

/// Points subtracted for a correct guess and for finishing first.
const SOLVE_BONUS: u32 = 5;
const WRONG_GUESS: u32 = 1;
const GAVE_UP: u32 = 3;

#[derive(Debug, Clone)]
struct WordGolfPlayer {
    username: String,
    points: u32,
    /// Target words; the last one is the word being solved.
    queue: Vec<String>,
    /// Guesses already made against the current word.
    guessed: HashSet<String>,
    /// Feedback entries for the current word.
    history: Vec<String>,
    /// Solved words available to send, in the order they were stashed.
    stash: Vec<String>,
}

impl WordGolfPlayer {
    fn new(username: String, queue: Vec<String>) -> Self {
        Self {
            username,
            points: 0,
            queue,
            guessed: HashSet::new(),
            history: Vec::new(),
            stash: Vec::new(),
        }
    }

    fn current(&self) -> Option<&str> {
        self.queue.last().map(String::as_str)
    }

    fn advance(&mut self) {
        self.queue.pop();
        self.guessed.clear();
        self.history.clear();
    }
}

pub struct WordGolfGame {
    players: [WordGolfPlayer; 2],
    /// Every word solved by anyone so far.
    solved: HashSet<String>,
    config: WordGolfConfig,
    result: Option<GameResult>,
}

impl WordGolfGame {
    /// `queues` are indexed by seat; each queue's last word comes first.
    pub fn new(usernames: [String; 2], queues: [Vec<String>; 2], config: WordGolfConfig) -> Self {
        let [first, second] = usernames;
        let [q1, q2] = queues;
        Self {
            players: [WordGolfPlayer::new(first, q1), WordGolfPlayer::new(second, q2)],
            solved: HashSet::new(),
            config,
            result: None,
        }
    }

    pub fn points(&self, seat: Seat) -> u32 {
        self.players[seat.index()].points
    }

    pub fn queue_len(&self, seat: Seat) -> usize {
        self.players[seat.index()].queue.len()
    }

    pub fn current_word(&self, seat: Seat) -> Option<&str> {
        self.players[seat.index()].current()
    }

    pub fn stash(&self, seat: Seat) -> &[String] {
        &self.players[seat.index()].stash
    }

    fn update_for(&self, seat: Seat) -> Step {
        let own = &self.players[seat.index()];
        let other = &self.players[seat.other().index()];
        Step::to_player(
            seat,
            ServerCommand::Update {
                own_points: own.points,
                own_queue: own.queue.len(),
                opponent_points: other.points,
                opponent_queue: other.queue.len(),
            },
        )
    }

    fn updates(&self) -> impl Iterator<Item = Step> + '_ {
        Seat::BOTH.into_iter().map(|seat| self.update_for(seat))
    }

    fn stashed_words(&self, seat: Seat) -> Step {
        Step::to_player(seat, ServerCommand::StashedWords(self.players[seat.index()].stash.clone()))
    }

    /// Ends the match once `seat` has run out of words.
    fn finish_if_done(&mut self, seat: Seat) {
        if self.result.is_some() || !self.players[seat.index()].queue.is_empty() {
            return;
        }
        let finisher = &mut self.players[seat.index()];
        finisher.points = finisher.points.saturating_sub(SOLVE_BONUS);

        let [a, b] = &self.players;
        self.result = Some(match a.points.cmp(&b.points) {
            std::cmp::Ordering::Less => GameResult::won_by(Winner::Username(a.username.clone())),
            std::cmp::Ordering::Greater => GameResult::won_by(Winner::Username(b.username.clone())),
            std::cmp::Ordering::Equal => GameResult::tie(),
        });
        debug!(finisher = %self.players[seat.index()].username, "queue emptied, match over");
    }

    fn guess(&mut self, seat: Seat, word: &str) -> Vec<Step> {
        let max_attempts = self.config.max_attempts;
        let player = &mut self.players[seat.index()];
        let Some(target) = player.current().map(str::to_owned) else {
            return Vec::new();
        };

        let guess = word.to_ascii_uppercase();
        if guess.len() != target.len() || !guess.chars().all(|c| c.is_ascii_alphabetic()) {
            debug!(?seat, %guess, "guess has the wrong shape");
            return Vec::new();
        }
        if !player.guessed.insert(guess.clone()) {
            debug!(?seat, %guess, "word already guessed");
            return Vec::new();
        }

        let marks = feedback(&target, &guess);
        player.history.push(history_entry(&guess, &marks));
        let history = player.history.clone();

        if guess == target {
            player.points = player.points.saturating_sub(SOLVE_BONUS);
            if self.solved.insert(target.clone()) {
                player.stash.push(target);
            }
            player.advance();
        } else if player.history.len() >= max_attempts {
            player.points += GAVE_UP;
            player.advance();
        } else {
            player.points += WRONG_GUESS;
        }

        self.finish_if_done(seat);

        let mut steps = vec![
            Step::to_player(seat, ServerCommand::FeedbackHistory(history)),
            self.stashed_words(seat),
        ];
        steps.extend(self.updates());
        steps
    }

    fn send_stashed(&mut self, seat: Seat, word: &str) -> Vec<Step> {
        let word = word.to_ascii_uppercase();
        let sender = &mut self.players[seat.index()];
        let Some(at) = sender.stash.iter().position(|w| *w == word) else {
            debug!(?seat, %word, "word is not in the stash");
            return Vec::new();
        };
        sender.stash.remove(at);
        // Bottom of the queue: the receiver finishes their current words first.
        self.players[seat.other().index()].queue.insert(0, word);

        let mut steps = vec![
            Step::to_player(seat.other(), ServerCommand::Alert(Alert::ReceivedWord)),
            self.stashed_words(seat),
        ];
        steps.extend(self.updates());
        steps
    }
}

impl GameEngine for WordGolfGame {
    fn kind(&self) -> GameKind {
        GameKind::WordGolf
    }

    fn start(&mut self) -> Vec<Step> {
        let mut steps: Vec<Step> = Seat::BOTH
            .into_iter()
            .map(|seat| {
                Step::to_player(
                    seat,
                    ServerCommand::GameStart(GameStart::WordGolf {
                        opponent: self.players[seat.other().index()].username.clone(),
                    }),
                )
            })
            .collect();
        steps.extend(self.updates());
        for seat in Seat::BOTH {
            self.finish_if_done(seat);
        }
        steps
    }

    fn handle_command(&mut self, seat: Seat, cmd: ClientCommand) -> Vec<Step> {
        if self.result.is_some() {
            return Vec::new();
        }
        match cmd {
            ClientCommand::Guess { word } => self.guess(seat, &word),
            ClientCommand::SendStashedWord { word } => self.send_stashed(seat, &word),
            other => {
                debug!(?seat, verb = other.verb(), "ignoring command");
                Vec::new()
            }
        }
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
    use super::*;

    fn game(q1: &[&str], q2: &[&str]) -> WordGolfGame {
        let queue = |q: &[&str]| q.iter().map(|w| w.to_string()).collect();
        WordGolfGame::new(
            ["alice".into(), "bob".into()],
            [queue(q1), queue(q2)],
            WordGolfConfig::default(),
        )
    }

    fn guess(word: &str) -> ClientCommand {
        ClientCommand::Guess { word: word.into() }
    }

    fn update(own: (u32, usize), opp: (u32, usize)) -> ServerCommand {
        ServerCommand::Update {
            own_points: own.0,
            own_queue: own.1,
            opponent_points: opp.0,
            opponent_queue: opp.1,
        }
    }

    #[test]
    fn test_start_sends_opponents_and_updates() {
        let mut game = game(&["CRANE", "HONEY"], &["LINEN", "PIANO"]);
        let steps = game.start();
        assert_eq!(
            steps[0],
            Step::to_player(
                Seat::First,
                ServerCommand::GameStart(GameStart::WordGolf { opponent: "bob".into() })
            )
        );
        assert_eq!(
            steps[1],
            Step::to_player(
                Seat::Second,
                ServerCommand::GameStart(GameStart::WordGolf { opponent: "alice".into() })
            )
        );
        assert_eq!(steps[2], Step::to_player(Seat::First, update((0, 2), (0, 2))));
        assert_eq!(steps[3], Step::to_player(Seat::Second, update((0, 2), (0, 2))));
        assert!(game.result().is_none());
    }

    #[test]
    fn test_guess_wrong_adds_point_and_sends_feedback() {
        let mut game = game(&["CRANE", "HONEY"], &["PIANO"]);
        let steps = game.handle_command(Seat::First, guess("linen"));
        assert_eq!(
            steps[0],
            Step::to_player(Seat::First, ServerCommand::FeedbackHistory(vec!["XLXIONOEXN".into()]))
        );
        assert_eq!(steps[1], Step::to_player(Seat::First, ServerCommand::StashedWords(vec![])));
        assert_eq!(steps[2], Step::to_player(Seat::First, update((1, 2), (0, 1))));
        assert_eq!(steps[3], Step::to_player(Seat::Second, update((0, 1), (1, 2))));
        assert_eq!(game.current_word(Seat::First), Some("HONEY"));
    }

    #[test]
    fn test_guess_feedback_history_frame_with_repeated_letters() {
        let mut game = game(&["LEVEL"], &["PIANO"]);
        game.handle_command(Seat::First, guess("eells"));
        let steps = game.handle_command(Seat::First, guess("lever"));
        let Step::Send(_, history) = &steps[0] else {
            panic!("expected feedback first, got {:?}", steps[0]);
        };
        assert_eq!(history.to_string(), "?feedback-history:!EOE!L!LXS:OLOEOVOEXR");
    }

    #[test]
    fn test_guess_repeat_and_bad_shape_are_ignored() {
        let mut game = game(&["CRANE", "HONEY"], &["PIANO"]);
        game.handle_command(Seat::First, guess("LINEN"));
        assert!(game.handle_command(Seat::First, guess("linen")).is_empty());
        assert!(game.handle_command(Seat::First, guess("LONG")).is_empty());
        assert!(game.handle_command(Seat::First, guess("H0NEY")).is_empty());
        assert_eq!(game.points(Seat::First), 1);
    }

    #[test]
    fn test_guess_correct_subtracts_floored_and_stashes() {
        let mut game = game(&["CRANE", "HONEY"], &["PIANO"]);
        game.handle_command(Seat::First, guess("LINEN"));
        let steps = game.handle_command(Seat::First, guess("HONEY"));
        assert_eq!(
            steps[0],
            Step::to_player(
                Seat::First,
                ServerCommand::FeedbackHistory(vec!["XLXIONOEXN".into(), "OHOOONOEOY".into()])
            )
        );
        assert_eq!(
            steps[1],
            Step::to_player(Seat::First, ServerCommand::StashedWords(vec!["HONEY".into()]))
        );
        assert_eq!(game.points(Seat::First), 0);
        assert_eq!(game.current_word(Seat::First), Some("CRANE"));
    }

    #[test]
    fn test_guess_word_solved_before_is_not_stashed_again() {
        let mut game = game(&["CRANE", "HONEY"], &["PIANO", "HONEY"]);
        game.handle_command(Seat::First, guess("HONEY"));
        game.handle_command(Seat::Second, guess("HONEY"));
        assert_eq!(game.stash(Seat::First), ["HONEY".to_string()]);
        assert!(game.stash(Seat::Second).is_empty());
    }

    #[test]
    fn test_guess_last_attempt_scores_three_and_advances() {
        let mut game = game(&["CRANE", "HONEY"], &["PIANO"]);
        for word in ["LINEN", "PIANO", "CRANE", "SLATE", "TIGER"] {
            game.handle_command(Seat::First, guess(word));
        }
        assert_eq!(game.points(Seat::First), 5);
        game.handle_command(Seat::First, guess("WATER"));
        assert_eq!(game.points(Seat::First), 8);
        assert_eq!(game.current_word(Seat::First), Some("CRANE"));
        // The guessed set was cleared with the old word.
        assert!(!game.handle_command(Seat::First, guess("LINEN")).is_empty());
    }

    #[test]
    fn test_send_stashed_word_lengthens_opponent_queue() {
        let mut game = game(&["CRANE", "HONEY"], &["PIANO"]);
        game.handle_command(Seat::First, guess("HONEY"));

        let steps = game.handle_command(
            Seat::First,
            ClientCommand::SendStashedWord { word: "honey".into() },
        );
        assert_eq!(
            steps[0],
            Step::to_player(Seat::Second, ServerCommand::Alert(Alert::ReceivedWord))
        );
        assert_eq!(steps[1], Step::to_player(Seat::First, ServerCommand::StashedWords(vec![])));
        assert_eq!(game.queue_len(Seat::Second), 2);
        // The current word is unchanged; the new word waits at the bottom.
        assert_eq!(game.current_word(Seat::Second), Some("PIANO"));
    }

    #[test]
    fn test_send_stashed_word_not_held_is_ignored() {
        let mut game = game(&["CRANE", "HONEY"], &["PIANO"]);
        let steps = game.handle_command(
            Seat::First,
            ClientCommand::SendStashedWord { word: "HONEY".into() },
        );
        assert!(steps.is_empty());
        assert_eq!(game.queue_len(Seat::Second), 1);
    }

    #[test]
    fn test_empty_queue_applies_bonus_and_decides_winner() {
        let mut game = game(&["HONEY"], &["PIANO"]);
        game.handle_command(Seat::Second, guess("LINEN"));
        game.handle_command(Seat::Second, guess("CRANE"));
        let steps = game.handle_command(Seat::First, guess("HONEY"));
        assert_eq!(steps.len(), 4);
        assert_eq!(
            game.result(),
            Some(GameResult::won_by(Winner::Username("alice".into())))
        );
        assert!(game.handle_command(Seat::Second, guess("PIANO")).is_empty());
    }

    #[test]
    fn test_empty_queue_equal_scores_is_tie() {
        let mut game = game(&["HONEY"], &["PIANO"]);
        game.handle_command(Seat::First, guess("HONEY"));
        assert_eq!(game.result(), Some(GameResult::tie()));
    }
}
