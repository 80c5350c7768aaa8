//! Typed commands and their text encoding.
//!
//! On the wire a command is a sigil followed by colon-separated fields:
//!
//! ```text
//! !move:6:0:5:0
//! ?game-start:stratego:r:bob
//! ```
//!
//! Inside the server every command is one of two closed enums,
//! [`ClientCommand`] (what clients send) and [`ServerCommand`] (what the
//! server sends). Adding a verb means adding a variant, and every `match`
//! over commands stops compiling until it handles the new case.
//!
//! Both enums implement `Display` to produce the wire text (without the
//! terminator) and have a `decode` function that parses it back.
//! `frame()` adds the terminator for sending.

use std::fmt;
use std::str::FromStr;

use crate::types::{
    Alert, BoardPos, Color, EndReason, GameKind, INTENT_SIGIL, MoveResultKind,
    QUERY_SIGIL, TERMINATOR, TurnState, validate_username,
};
use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Splits a command into `(sigil, verb, fields after the verb)`.
fn split_command(command: &str) -> Result<(char, &str, Vec<&str>), ProtocolError> {
    let mut chars = command.chars();
    let sigil = chars
        .next()
        .filter(|c| *c == QUERY_SIGIL || *c == INTENT_SIGIL)
        .ok_or_else(|| ProtocolError::MissingSigil {
            expected: INTENT_SIGIL,
            command: command.to_string(),
        })?;
    let mut parts = chars.as_str().split(':');
    let verb = parts.next().unwrap_or_default();
    Ok((sigil, verb, parts.collect()))
}

fn expect_fields(verb: &str, fields: &[&str], n: usize) -> Result<(), ProtocolError> {
    if fields.len() != n {
        return Err(ProtocolError::malformed(
            verb,
            format!("expected {n} fields, got {}", fields.len()),
        ));
    }
    Ok(())
}

fn parse_field<T: FromStr>(verb: &str, field: &str) -> Result<T, ProtocolError> {
    field
        .parse()
        .map_err(|_| ProtocolError::malformed(verb, format!("bad field '{field}'")))
}

/// A trailing list of fields. An empty list is sent as a single empty field.
fn list_fields(fields: &[&str]) -> Vec<String> {
    match fields {
        [] | [""] => Vec::new(),
        _ => fields.iter().map(|f| f.to_string()).collect(),
    }
}

// ---------------------------------------------------------------------------
// ClientCommand
// ---------------------------------------------------------------------------

/// Everything a client may send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// `?game:<kind>:<username>[:extra...]`, the lobby declaration.
    ///
    /// `extra` carries game-specific loadout, such as the 40 deck cells
    /// for Stratego.
    Declare {
        kind: GameKind,
        username: String,
        extra: Vec<String>,
    },
    /// `!move:<r1>:<c1>:<r2>:<c2>`
    Move { from: BoardPos, to: BoardPos },
    /// `!guess:<word>`
    Guess { word: String },
    /// `!send-stashed-word:<word>`
    SendStashedWord { word: String },
    /// `!car-turn:straight|left|right`
    CarTurn(TurnState),
}

impl ClientCommand {
    /// The verb that identifies this command on the wire.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Declare { .. } => "game",
            Self::Move { .. } => "move",
            Self::Guess { .. } => "guess",
            Self::SendStashedWord { .. } => "send-stashed-word",
            Self::CarTurn(_) => "car-turn",
        }
    }

    /// Wire text of this command, without terminator.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Wire text of this command followed by the terminator.
    pub fn frame(&self) -> String {
        format!("{self}{TERMINATOR}")
    }

    /// Parses one command (without terminator).
    pub fn decode(command: &str) -> Result<Self, ProtocolError> {
        let (sigil, verb, fields) = split_command(command)?;
        match (sigil, verb) {
            (QUERY_SIGIL, "game") => {
                if fields.len() < 2 {
                    return Err(ProtocolError::malformed(
                        verb,
                        "expected kind and username",
                    ));
                }
                let kind = fields[0].parse()?;
                let username = fields[1].to_string();
                validate_username(&username)?;
                let extra = fields[2..].iter().map(|f| f.to_string()).collect();
                Ok(Self::Declare {
                    kind,
                    username,
                    extra,
                })
            }
            (INTENT_SIGIL, "move") => {
                expect_fields(verb, &fields, 4)?;
                Ok(Self::Move {
                    from: BoardPos::new(
                        parse_field(verb, fields[0])?,
                        parse_field(verb, fields[1])?,
                    ),
                    to: BoardPos::new(
                        parse_field(verb, fields[2])?,
                        parse_field(verb, fields[3])?,
                    ),
                })
            }
            (INTENT_SIGIL, "guess") => {
                expect_fields(verb, &fields, 1)?;
                if fields[0].is_empty() {
                    return Err(ProtocolError::malformed(verb, "empty word"));
                }
                Ok(Self::Guess {
                    word: fields[0].to_string(),
                })
            }
            (INTENT_SIGIL, "send-stashed-word") => {
                expect_fields(verb, &fields, 1)?;
                Ok(Self::SendStashedWord {
                    word: fields[0].to_string(),
                })
            }
            (INTENT_SIGIL, "car-turn") => {
                expect_fields(verb, &fields, 1)?;
                Ok(Self::CarTurn(fields[0].parse()?))
            }
            _ => Err(ProtocolError::UnknownVerb(verb.to_string())),
        }
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declare {
                kind,
                username,
                extra,
            } => {
                write!(f, "{QUERY_SIGIL}game:{kind}:{username}")?;
                for field in extra {
                    write!(f, ":{field}")?;
                }
                Ok(())
            }
            Self::Move { from, to } => write!(f, "{INTENT_SIGIL}move:{from}:{to}"),
            Self::Guess { word } => write!(f, "{INTENT_SIGIL}guess:{word}"),
            Self::SendStashedWord { word } => {
                write!(f, "{INTENT_SIGIL}send-stashed-word:{word}")
            }
            Self::CarTurn(turn) => {
                write!(f, "{INTENT_SIGIL}car-turn:{}", turn.as_str())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ServerCommand
// ---------------------------------------------------------------------------

/// Starting position of one racer, sent in the racing game's `?game-start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RacerStart {
    pub username: String,
    pub x: i64,
    pub y: i64,
}

/// Per-game payload of `?game-start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameStart {
    /// `?game-start:stratego:<color>:<opponent>`
    Stratego { color: Color, opponent: String },
    /// `?game-start:word_golf:<opponent>`
    WordGolf { opponent: String },
    /// `?game-start:secret_game:<own idx>:<p1>:<x1>:<y1>:<p2>:<x2>:<y2>`
    SecretGame {
        own_index: usize,
        racers: [RacerStart; 2],
    },
}

impl GameStart {
    pub fn kind(&self) -> GameKind {
        match self {
            Self::Stratego { .. } => GameKind::Stratego,
            Self::WordGolf { .. } => GameKind::WordGolf,
            Self::SecretGame { .. } => GameKind::SecretGame,
        }
    }
}

/// Everything the server may send.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerCommand {
    GameStart(GameStart),
    /// Whose turn it is plus the 100 board cells, row-major.
    TurnInfo { turn: Color, board: Vec<String> },
    MoveResult {
        kind: MoveResultKind,
        from: BoardPos,
        to: BoardPos,
    },
    /// Word Golf scoreboard, from the receiving player's point of view.
    Update {
        own_points: u32,
        own_queue: usize,
        opponent_points: u32,
        opponent_queue: usize,
    },
    /// Feedback for the current word, one entry per attempt: a marker and
    /// the letter for every letter guessed (`XLXIONOEXN`).
    FeedbackHistory(Vec<String>),
    StashedWords(Vec<String>),
    Alert(Alert),
    Countdown(u32),
    RaceStart,
    /// Car position, rounded to whole pixels.
    Pos { index: usize, x: i64, y: i64 },
    Angle { index: usize, radians: f32 },
    LapCompletion { index: usize, laps: u32 },
    GameOver {
        kind: GameKind,
        reason: EndReason,
        payload: Option<String>,
    },
}

impl ServerCommand {
    /// The verb that identifies this command on the wire.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::GameStart(_) => "game-start",
            Self::TurnInfo { .. } => "turn-info",
            Self::MoveResult { .. } => "move-result",
            Self::Update { .. } => "update",
            Self::FeedbackHistory(_) => "feedback-history",
            Self::StashedWords(_) => "stashed-words",
            Self::Alert(_) => "alert",
            Self::Countdown(_) => "countdown",
            Self::RaceStart => "race-start",
            Self::Pos { .. } => "pos",
            Self::Angle { .. } => "angle",
            Self::LapCompletion { .. } => "lap-completion",
            Self::GameOver { .. } => "game-over",
        }
    }

    /// Wire text of this command, without terminator.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Wire text of this command followed by the terminator.
    pub fn frame(&self) -> String {
        format!("{self}{TERMINATOR}")
    }

    /// Parses one command (without terminator).
    ///
    /// The server never needs this; clients and tests do.
    pub fn decode(command: &str) -> Result<Self, ProtocolError> {
        let (sigil, verb, fields) = split_command(command)?;
        if sigil != QUERY_SIGIL {
            return Err(ProtocolError::MissingSigil {
                expected: QUERY_SIGIL,
                command: command.to_string(),
            });
        }

        match verb {
            "game-start" => decode_game_start(&fields).map(Self::GameStart),
            "turn-info" => {
                let Some((turn, board)) = fields.split_first() else {
                    return Err(ProtocolError::malformed(verb, "missing turn"));
                };
                Ok(Self::TurnInfo {
                    turn: turn.parse()?,
                    board: board.iter().map(|c| c.to_string()).collect(),
                })
            }
            "move-result" => {
                expect_fields(verb, &fields, 5)?;
                Ok(Self::MoveResult {
                    kind: fields[0].parse()?,
                    from: BoardPos::new(
                        parse_field(verb, fields[1])?,
                        parse_field(verb, fields[2])?,
                    ),
                    to: BoardPos::new(
                        parse_field(verb, fields[3])?,
                        parse_field(verb, fields[4])?,
                    ),
                })
            }
            "update" => {
                expect_fields(verb, &fields, 4)?;
                Ok(Self::Update {
                    own_points: parse_field(verb, fields[0])?,
                    own_queue: parse_field(verb, fields[1])?,
                    opponent_points: parse_field(verb, fields[2])?,
                    opponent_queue: parse_field(verb, fields[3])?,
                })
            }
            "feedback-history" => Ok(Self::FeedbackHistory(list_fields(&fields))),
            "stashed-words" => Ok(Self::StashedWords(list_fields(&fields))),
            "alert" => {
                expect_fields(verb, &fields, 1)?;
                Ok(Self::Alert(fields[0].parse()?))
            }
            "countdown" => {
                expect_fields(verb, &fields, 1)?;
                Ok(Self::Countdown(parse_field(verb, fields[0])?))
            }
            "race-start" => Ok(Self::RaceStart),
            "pos" => {
                expect_fields(verb, &fields, 3)?;
                Ok(Self::Pos {
                    index: parse_field(verb, fields[0])?,
                    x: parse_field(verb, fields[1])?,
                    y: parse_field(verb, fields[2])?,
                })
            }
            "angle" => {
                expect_fields(verb, &fields, 2)?;
                Ok(Self::Angle {
                    index: parse_field(verb, fields[0])?,
                    radians: parse_field(verb, fields[1])?,
                })
            }
            "lap-completion" => {
                expect_fields(verb, &fields, 2)?;
                Ok(Self::LapCompletion {
                    index: parse_field(verb, fields[0])?,
                    laps: parse_field(verb, fields[1])?,
                })
            }
            "game-over" => {
                if !(2..=3).contains(&fields.len()) {
                    return Err(ProtocolError::malformed(
                        verb,
                        "expected kind, reason and optional payload",
                    ));
                }
                Ok(Self::GameOver {
                    kind: fields[0].parse()?,
                    reason: fields[1].parse()?,
                    payload: fields.get(2).map(|p| p.to_string()),
                })
            }
            other => Err(ProtocolError::UnknownVerb(other.to_string())),
        }
    }
}

fn decode_game_start(fields: &[&str]) -> Result<GameStart, ProtocolError> {
    const VERB: &str = "game-start";
    let Some((kind, rest)) = fields.split_first() else {
        return Err(ProtocolError::malformed(VERB, "missing game kind"));
    };
    match kind.parse::<GameKind>()? {
        GameKind::Stratego => {
            expect_fields(VERB, rest, 2)?;
            Ok(GameStart::Stratego {
                color: rest[0].parse()?,
                opponent: rest[1].to_string(),
            })
        }
        GameKind::WordGolf => {
            expect_fields(VERB, rest, 1)?;
            Ok(GameStart::WordGolf {
                opponent: rest[0].to_string(),
            })
        }
        GameKind::SecretGame => {
            expect_fields(VERB, rest, 7)?;
            let racer = |at: usize| -> Result<RacerStart, ProtocolError> {
                Ok(RacerStart {
                    username: rest[at].to_string(),
                    x: parse_field(VERB, rest[at + 1])?,
                    y: parse_field(VERB, rest[at + 2])?,
                })
            };
            Ok(GameStart::SecretGame {
                own_index: parse_field(VERB, rest[0])?,
                racers: [racer(1)?, racer(4)?],
            })
        }
    }
}

impl fmt::Display for ServerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{QUERY_SIGIL}{}", self.verb())?;
        match self {
            Self::GameStart(start) => {
                write!(f, ":{}", start.kind())?;
                match start {
                    GameStart::Stratego { color, opponent } => {
                        write!(f, ":{color}:{opponent}")
                    }
                    GameStart::WordGolf { opponent } => write!(f, ":{opponent}"),
                    GameStart::SecretGame { own_index, racers } => {
                        write!(f, ":{own_index}")?;
                        for r in racers {
                            write!(f, ":{}:{}:{}", r.username, r.x, r.y)?;
                        }
                        Ok(())
                    }
                }
            }
            Self::TurnInfo { turn, board } => {
                write!(f, ":{turn}:{}", board.join(":"))
            }
            Self::MoveResult { kind, from, to } => {
                write!(f, ":{}:{from}:{to}", kind.as_str())
            }
            Self::Update {
                own_points,
                own_queue,
                opponent_points,
                opponent_queue,
            } => write!(
                f,
                ":{own_points}:{own_queue}:{opponent_points}:{opponent_queue}"
            ),
            Self::FeedbackHistory(entries) | Self::StashedWords(entries) => {
                write!(f, ":{}", entries.join(":"))
            }
            Self::Alert(alert) => write!(f, ":{}", alert.as_str()),
            Self::Countdown(n) => write!(f, ":{n}"),
            Self::RaceStart => Ok(()),
            Self::Pos { index, x, y } => write!(f, ":{index}:{x}:{y}"),
            Self::Angle { index, radians } => write!(f, ":{index}:{radians}"),
            Self::LapCompletion { index, laps } => write!(f, ":{index}:{laps}"),
            Self::GameOver {
                kind,
                reason,
                payload,
            } => {
                write!(f, ":{kind}:{}", reason.as_str())?;
                if let Some(payload) = payload {
                    write!(f, ":{payload}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_declare_with_deck_fields() {
        let deck = vec!["B"; 40].join(":");
        let cmd = ClientCommand::decode(&format!("?game:stratego:alice:{deck}")).unwrap();
        match cmd {
            ClientCommand::Declare {
                kind,
                username,
                extra,
            } => {
                assert_eq!(kind, GameKind::Stratego);
                assert_eq!(username, "alice");
                assert_eq!(extra.len(), 40);
            }
            other => panic!("expected Declare, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_declare_without_extra() {
        let cmd = ClientCommand::decode("?game:word_golf:bob").unwrap();
        assert_eq!(
            cmd,
            ClientCommand::Declare {
                kind: GameKind::WordGolf,
                username: "bob".into(),
                extra: vec![],
            }
        );
    }

    #[test]
    fn test_decode_declare_bad_username_is_error() {
        let long = "x".repeat(21);
        let err = ClientCommand::decode(&format!("?game:word_golf:{long}")).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidUsername(_)));
    }

    #[test]
    fn test_decode_move_parses_coordinates() {
        let cmd = ClientCommand::decode("!move:6:0:5:0").unwrap();
        assert_eq!(
            cmd,
            ClientCommand::Move {
                from: BoardPos::new(6, 0),
                to: BoardPos::new(5, 0),
            }
        );
    }

    #[test]
    fn test_decode_move_negative_is_malformed() {
        let err = ClientCommand::decode("!move:-1:0:5:0").unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed { .. }));
    }

    #[test]
    fn test_decode_move_wrong_field_count_is_malformed() {
        let err = ClientCommand::decode("!move:1:2:3").unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed { .. }));
    }

    #[test]
    fn test_decode_car_turn() {
        let cmd = ClientCommand::decode("!car-turn:left").unwrap();
        assert_eq!(cmd, ClientCommand::CarTurn(TurnState::Left));
        assert!(ClientCommand::decode("!car-turn:up").is_err());
    }

    #[test]
    fn test_decode_client_unknown_verb() {
        let err = ClientCommand::decode("!dance:now").unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownVerb(ref v) if v == "dance"));
    }

    #[test]
    fn test_decode_guess_with_wrong_sigil_is_unknown() {
        // `guess` is only an intent; under `?` it is not a known verb.
        assert!(ClientCommand::decode("?guess:crane").is_err());
    }

    #[test]
    fn test_client_frame_appends_terminator() {
        let cmd = ClientCommand::Guess {
            word: "CRANE".into(),
        };
        assert_eq!(cmd.frame(), "!guess:CRANE\\");
    }

    #[test]
    fn test_encode_game_start_variants() {
        let stratego = ServerCommand::GameStart(GameStart::Stratego {
            color: Color::Red,
            opponent: "bob".into(),
        });
        assert_eq!(stratego.to_string(), "?game-start:stratego:r:bob");

        let word_golf = ServerCommand::GameStart(GameStart::WordGolf {
            opponent: "alice".into(),
        });
        assert_eq!(word_golf.to_string(), "?game-start:word_golf:alice");

        let race = ServerCommand::GameStart(GameStart::SecretGame {
            own_index: 1,
            racers: [
                RacerStart {
                    username: "alice".into(),
                    x: 48,
                    y: 80,
                },
                RacerStart {
                    username: "bob".into(),
                    x: 48,
                    y: 112,
                },
            ],
        });
        assert_eq!(
            race.to_string(),
            "?game-start:secret_game:1:alice:48:80:bob:48:112"
        );
        assert_eq!(ServerCommand::decode(&race.to_string()).unwrap(), race);
    }

    #[test]
    fn test_encode_turn_info_keeps_empty_cells() {
        let cmd = ServerCommand::TurnInfo {
            turn: Color::Blue,
            board: vec!["rF".into(), String::new(), "XX".into()],
        };
        assert_eq!(cmd.to_string(), "?turn-info:b:rF::XX");
    }

    #[test]
    fn test_encode_empty_lists_leave_trailing_colon() {
        assert_eq!(
            ServerCommand::FeedbackHistory(vec![]).to_string(),
            "?feedback-history:"
        );
        assert_eq!(
            ServerCommand::decode("?stashed-words:").unwrap(),
            ServerCommand::StashedWords(vec![])
        );
    }

    #[test]
    fn test_encode_game_over_with_and_without_payload() {
        let win = ServerCommand::GameOver {
            kind: GameKind::Stratego,
            reason: EndReason::WinnerDetermined,
            payload: Some("b".into()),
        };
        assert_eq!(win.to_string(), "?game-over:stratego:winner-determined:b");

        let abrupt = ServerCommand::GameOver {
            kind: GameKind::WordGolf,
            reason: EndReason::AbruptEnd,
            payload: None,
        };
        assert_eq!(abrupt.to_string(), "?game-over:word_golf:abrupt-end");
        assert_eq!(ServerCommand::decode("?game-over:word_golf:abrupt-end").unwrap(), abrupt);
    }

    #[test]
    fn test_decode_server_command_rejects_intent_sigil() {
        let err = ServerCommand::decode("!update:1:2:3:4").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_decode_update_and_move_result() {
        assert_eq!(
            ServerCommand::decode("?update:3:4:0:5").unwrap(),
            ServerCommand::Update {
                own_points: 3,
                own_queue: 4,
                opponent_points: 0,
                opponent_queue: 5,
            }
        );
        assert_eq!(
            ServerCommand::decode("?move-result:attack_fail:6:1:5:1").unwrap(),
            ServerCommand::MoveResult {
                kind: MoveResultKind::AttackFail,
                from: BoardPos::new(6, 1),
                to: BoardPos::new(5, 1),
            }
        );
    }
}
