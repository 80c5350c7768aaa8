//! Car kinematics and lap tracking.

use std::f32::consts::TAU;

use arcade_protocol::TurnState;

use crate::config::SecretGameConfig;

use super::map::{Tile, TrackMap};

/// A point or offset in pixel space. `y` grows downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` radians.
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn scale(&self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: &Vec2) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

/// Checkpoints passed since the last lap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LapProgress {
    #[default]
    Start,
    PassedA,
    PassedB,
}

#[derive(Debug, Clone)]
pub struct Car {
    pub position: Vec2,
    /// Heading in radians, always in `[0, 2π)`.
    pub angle: f32,
    pub turn: TurnState,
    pub laps: u32,
    speed: f32,
    progress: LapProgress,
    spawn: Vec2,
}

impl Car {
    pub fn new(spawn: Vec2, speed: f32) -> Self {
        Self {
            position: spawn,
            angle: 0.0,
            turn: TurnState::Straight,
            laps: 0,
            speed,
            progress: LapProgress::Start,
            spawn,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn progress(&self) -> LapProgress {
        self.progress
    }

    fn respawn(&mut self) {
        self.position = self.spawn;
        self.angle = 0.0;
        self.progress = LapProgress::Start;
    }

    /// The four corners of the car's axis-aligned bounding box.
    fn corners(&self, size: f32) -> [Vec2; 4] {
        let h = size / 2.0;
        let Vec2 { x, y } = self.position;
        [
            Vec2::new(x - h, y - h),
            Vec2::new(x + h, y - h),
            Vec2::new(x - h, y + h),
            Vec2::new(x + h, y + h),
        ]
    }

    /// Advances the car by `dt` seconds. Returns `true` when the step
    /// completed a lap.
    pub fn step(&mut self, dt: f32, map: &TrackMap, config: &SecretGameConfig) -> bool {
        let velocity = Vec2::from_angle(self.angle).scale(self.speed * dt);
        self.position = self.position.add(&velocity);

        let steer = match self.turn {
            TurnState::Straight => 0.0,
            TurnState::Left => -config.turn_rate * dt,
            TurnState::Right => config.turn_rate * dt,
        };
        self.angle = (self.angle + steer).rem_euclid(TAU);

        let half = config.car_size / 2.0;
        let (width, height) = map.size();
        self.position.x = self.position.x.clamp(half, (width - half).max(half));
        self.position.y = self.position.y.clamp(half, (height - half).max(half));

        let tiles = self.corners(config.car_size).map(|corner| map.tile_at(corner));
        let touching = |kind: Tile| tiles.contains(&kind);

        if touching(Tile::DeadZone) {
            self.respawn();
            self.speed = config.speed;
            return false;
        }

        self.speed = if touching(Tile::Wall) {
            config.speed * config.wall_speed_factor
        } else {
            config.speed
        };

        // Touching the previous marker without the current one means the
        // car is driving the lap backwards.
        match self.progress {
            LapProgress::Start if touching(Tile::CheckpointA) => {
                self.progress = LapProgress::PassedA;
            }
            LapProgress::PassedA if touching(Tile::CheckpointB) => {
                self.progress = LapProgress::PassedB;
            }
            LapProgress::PassedA if touching(Tile::Line) && !touching(Tile::CheckpointA) => {
                self.progress = LapProgress::Start;
            }
            LapProgress::PassedB if touching(Tile::Line) => {
                self.progress = LapProgress::Start;
                self.laps += 1;
                return true;
            }
            LapProgress::PassedB
                if touching(Tile::CheckpointA) && !touching(Tile::CheckpointB) =>
            {
                self.progress = LapProgress::Start;
            }
            _ => {}
        }
        false
    }
}
