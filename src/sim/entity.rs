//! Player and obstacle entities

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::tick::TickInput;
use crate::color::{Color, palette};
use crate::tuning::Tuning;

/// The player's square. Moves only along the vertical axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    pub color: Color,
    /// Pixels per frame
    pub speed: i32,
    /// Bottom edge of the playfield (screen height)
    pub floor: i32,
}

impl Player {
    /// Place a new player at its column, vertically centered
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            rect: Rect::new(
                tuning.player_x,
                tuning.player_start_y(),
                tuning.player_size,
                tuning.player_size,
            ),
            color: palette::PLAYER,
            speed: tuning.player_speed,
            floor: tuning.screen_height,
        }
    }

    /// Apply held direction keys.
    ///
    /// Up and down are checked independently; holding both moves up and then
    /// back down within the same frame. Each step is clamped to the playfield.
    pub fn update(&mut self, input: &TickInput) {
        if input.up && self.rect.top() > 0 {
            self.rect.pos.y = (self.rect.pos.y - self.speed).max(0);
        }
        if input.down && self.rect.bottom() < self.floor {
            self.rect.pos.y = (self.rect.pos.y + self.speed).min(self.floor - self.rect.size.y);
        }
    }
}

/// A square that scrolls in from the right edge at constant speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub rect: Rect,
    pub color: Color,
    /// Pixels per frame, leftward
    pub speed: i32,
}

impl Obstacle {
    /// Spawn at the right screen edge with a uniformly random top edge in
    /// [0, screen_height - obstacle_size]
    pub fn spawn<R: Rng + ?Sized>(id: u32, rng: &mut R, tuning: &Tuning) -> Self {
        let y = rng.random_range(0..=tuning.obstacle_max_y());
        Self::at(id, IVec2::new(tuning.screen_width, y), tuning)
    }

    /// Place an obstacle at an explicit top-left corner
    pub fn at(id: u32, pos: IVec2, tuning: &Tuning) -> Self {
        Self {
            id,
            rect: Rect {
                pos,
                size: IVec2::splat(tuning.obstacle_size),
            },
            color: palette::OBSTACLE,
            speed: tuning.obstacle_speed,
        }
    }

    pub fn update(&mut self) {
        self.rect.pos.x -= self.speed;
    }

    /// True once the right edge has passed x = 0
    pub fn is_off_screen(&self) -> bool {
        self.rect.right() < 0
    }
}
