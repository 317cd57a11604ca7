//! Game balance and arena dimensions
//!
//! Every gameplay constant the simulation reads comes from a `Tuning`.
//! The default reproduces the classic 800x600 arena from `consts`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub screen_width: i32,
    pub screen_height: i32,
    pub player_x: i32,
    pub player_size: i32,
    pub player_speed: i32,
    pub obstacle_size: i32,
    pub obstacle_speed: i32,
    pub spawn_interval_ms: u64,
    pub target_fps: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            player_x: PLAYER_X,
            player_size: PLAYER_SIZE,
            player_speed: PLAYER_SPEED,
            obstacle_size: OBSTACLE_SIZE,
            obstacle_speed: OBSTACLE_SPEED,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            target_fps: TARGET_FPS,
        }
    }
}

impl Tuning {
    /// Top edge of a freshly placed player (vertically centered)
    pub fn player_start_y(&self) -> i32 {
        self.screen_height / 2 - self.player_size / 2
    }

    /// Largest valid top edge for a spawned obstacle
    pub fn obstacle_max_y(&self) -> i32 {
        self.screen_height - self.obstacle_size
    }

    /// True when every entity fits inside the arena
    pub fn is_valid(&self) -> bool {
        self.screen_width > 0
            && self.player_size > 0
            && self.obstacle_size > 0
            && self.player_size <= self.screen_height
            && self.obstacle_size <= self.screen_height
            && self.player_speed >= 0
            && self.obstacle_speed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_classic_arena() {
        let tuning = Tuning::default();
        assert!(tuning.is_valid());
        assert_eq!(tuning.player_start_y(), 285);
        assert_eq!(tuning.obstacle_max_y(), 520);
    }

    #[test]
    fn test_obstacle_taller_than_screen_is_invalid() {
        let tuning = Tuning {
            screen_height: 60,
            ..Default::default()
        };
        assert!(!tuning.is_valid());
    }
}
