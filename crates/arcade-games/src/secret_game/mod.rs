//! The secret game: a two-car top-down race.
//!
//! After a countdown the cars drive on their own at constant speed; the
//! only input is steering. Every tick the driver calls [`GameEngine::tick`]
//! with the measured time step, and both clients receive every car's
//! position and heading. The first car to complete `laps_to_win` laps wins.

pub mod car;
pub mod map;

use std::sync::Arc;
use std::time::Duration;

use arcade_protocol::{ClientCommand, GameKind, GameStart, RacerStart, Seat, ServerCommand};
use arcade_tick::TickConfig;
use tracing::debug;

use crate::config::SecretGameConfig;
use crate::engine::{GameEngine, Step};
use crate::result::{GameResult, Winner};

pub use car::{Car, LapProgress, Vec2};
pub use map::{Tile, TrackMap};

pub struct SecretGame {
    usernames: [String; 2],
    map: Arc<TrackMap>,
    cars: [Car; 2],
    config: SecretGameConfig,
    result: Option<GameResult>,
}

impl SecretGame {
    pub fn new(usernames: [String; 2], map: Arc<TrackMap>, config: SecretGameConfig) -> Self {
        let cars = [0, 1].map(|i| Car::new(map.spawn(i), config.speed));
        Self {
            usernames,
            map,
            cars,
            config,
            result: None,
        }
    }

    pub fn car(&self, seat: Seat) -> &Car {
        &self.cars[seat.index()]
    }

    fn racers(&self) -> [RacerStart; 2] {
        [0, 1].map(|i| {
            let spawn = self.map.spawn(i);
            RacerStart {
                username: self.usernames[i].clone(),
                x: spawn.x.round() as i64,
                y: spawn.y.round() as i64,
            }
        })
    }
}

impl GameEngine for SecretGame {
    fn kind(&self) -> GameKind {
        GameKind::SecretGame
    }

    fn start(&mut self) -> Vec<Step> {
        let racers = self.racers();
        let mut steps: Vec<Step> = Seat::BOTH
            .into_iter()
            .map(|seat| {
                Step::to_player(
                    seat,
                    ServerCommand::GameStart(GameStart::SecretGame {
                        own_index: seat.index(),
                        racers: racers.clone(),
                    }),
                )
            })
            .collect();

        for n in (1..=self.config.countdown_from).rev() {
            steps.push(Step::to_all(ServerCommand::Countdown(n)));
            steps.push(Step::Pause(self.config.countdown_interval()));
        }
        steps.push(Step::to_all(ServerCommand::RaceStart));
        steps
    }

    fn handle_command(&mut self, seat: Seat, cmd: ClientCommand) -> Vec<Step> {
        match cmd {
            ClientCommand::CarTurn(turn) => self.cars[seat.index()].turn = turn,
            other => debug!(?seat, verb = other.verb(), "ignoring command"),
        }
        Vec::new()
    }

    fn tick(&mut self, dt: Duration) -> Vec<Step> {
        if self.result.is_some() {
            return Vec::new();
        }
        let dt = dt.as_secs_f32();
        let mut steps = Vec::with_capacity(6);

        for (index, car) in self.cars.iter_mut().enumerate() {
            let lapped = car.step(dt, &self.map, &self.config);
            steps.push(Step::to_all(ServerCommand::Pos {
                index,
                x: car.position.x.round() as i64,
                y: car.position.y.round() as i64,
            }));
            steps.push(Step::to_all(ServerCommand::Angle {
                index,
                radians: car.angle,
            }));
            if lapped {
                debug!(index, laps = car.laps, "lap completed");
                steps.push(Step::to_all(ServerCommand::LapCompletion {
                    index,
                    laps: car.laps,
                }));
            }
        }

        let finished: Vec<usize> = (0..2)
            .filter(|&i| self.cars[i].laps >= self.config.laps_to_win)
            .collect();
        self.result = match finished.as_slice() {
            [] => None,
            [index] => Some(GameResult::won_by(Winner::Index(*index))),
            _ => Some(GameResult::tie()),
        };
        steps
    }

    fn tick_config(&self) -> Option<TickConfig> {
        Some(TickConfig {
            first_dt: Duration::from_millis(self.config.first_tick_ms),
            ..TickConfig::with_rate(self.config.tick_rate_hz)
        })
    }

    fn input_wait(&self) -> Duration {
        Duration::from_millis(1)
    }

    fn result(&self) -> Option<GameResult> {
        self.result.clone()
    }
}
