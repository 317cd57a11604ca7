//! Game state and session lifecycle
//!
//! Everything needed to reproduce a run lives here, RNG included.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Obstacle, Player};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Run ended; frozen until reset
    GameOver,
}

/// A reading of both clocks at the same instant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Timestamp {
    /// Monotonic milliseconds, drives spawn cadence
    pub ticks_ms: u64,
    /// Wall-clock seconds, drives survival time
    pub wall_secs: f64,
}

impl Timestamp {
    pub const fn new(ticks_ms: u64, wall_secs: f64) -> Self {
        Self {
            ticks_ms,
            wall_secs,
        }
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Obstacle placement RNG; carries over across resets
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub player: Player,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Wall-clock seconds when the session started
    pub start_time: f64,
    /// Monotonic ticks of the last spawn (or session start)
    pub last_spawn_ticks: u64,
    /// Frozen on the transition to GameOver
    pub survival_time: Option<f64>,
    /// Next obstacle ID
    next_id: u32,
}

impl GameState {
    /// Create a new session with the default tuning
    pub fn new(seed: u64, now: Timestamp) -> Self {
        Self::with_tuning(seed, Tuning::default(), now)
    }

    /// Create a new session for a custom arena
    ///
    /// # Panics
    /// If the tuning cannot fit its entities on screen.
    pub fn with_tuning(seed: u64, tuning: Tuning, now: Timestamp) -> Self {
        assert!(tuning.is_valid(), "invalid tuning: {tuning:?}");
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(&tuning),
            tuning,
            phase: GamePhase::Playing,
            obstacles: Vec::new(),
            start_time: now.wall_secs,
            last_spawn_ticks: now.ticks_ms,
            survival_time: None,
            next_id: 1,
        }
    }

    /// Start a fresh session in place: new player, no obstacles, timers at `now`
    pub fn reset(&mut self, now: Timestamp) {
        self.phase = GamePhase::Playing;
        self.player = Player::new(&self.tuning);
        self.obstacles.clear();
        self.start_time = now.wall_secs;
        self.last_spawn_ticks = now.ticks_ms;
        self.survival_time = None;
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Seconds survived so far, or the frozen value once the run is over
    pub fn elapsed(&self, now: Timestamp) -> f64 {
        self.survival_time
            .unwrap_or(now.wall_secs - self.start_time)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append a new obstacle at the right edge, returning its ID
    pub fn spawn_obstacle(&mut self) -> u32 {
        let id = self.next_entity_id();
        let obstacle = Obstacle::spawn(id, &mut self.rng, &self.tuning);
        self.obstacles.push(obstacle);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rect::Rect;

    #[test]
    fn test_new_state_is_playing_and_empty() {
        let state = GameState::new(42, Timestamp::new(250, 1000.0));
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.player.rect, Rect::new(50, 285, 30, 30));
        assert_eq!(state.last_spawn_ticks, 250);
        assert_eq!(state.start_time, 1000.0);
        assert_eq!(state.survival_time, None);
    }

    #[test]
    fn test_reset_restores_fresh_session() {
        let mut state = GameState::new(42, Timestamp::new(0, 0.0));
        state.spawn_obstacle();
        state.spawn_obstacle();
        state.player.rect.pos.y = 0;
        state.phase = GamePhase::GameOver;
        state.survival_time = Some(12.5);

        state.reset(Timestamp::new(9000, 500.0));

        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.player.rect, Rect::new(50, 285, 30, 30));
        assert_eq!(state.start_time, 500.0);
        assert_eq!(state.last_spawn_ticks, 9000);
        assert_eq!(state.survival_time, None);
    }

    #[test]
    fn test_ids_keep_increasing_across_reset() {
        let mut state = GameState::new(1, Timestamp::default());
        let first = state.spawn_obstacle();
        state.reset(Timestamp::default());
        let second = state.spawn_obstacle();
        assert!(second > first);
    }

    #[test]
    fn test_elapsed_freezes_after_game_over() {
        let mut state = GameState::new(1, Timestamp::new(0, 100.0));
        assert_eq!(state.elapsed(Timestamp::new(0, 103.5)), 3.5);
        state.phase = GamePhase::GameOver;
        state.survival_time = Some(3.5);
        assert_eq!(state.elapsed(Timestamp::new(0, 200.0)), 3.5);
    }

    #[test]
    #[should_panic(expected = "invalid tuning")]
    fn test_rejects_obstacle_taller_than_screen() {
        let tuning = Tuning {
            screen_height: 50,
            ..Default::default()
        };
        GameState::with_tuning(1, tuning, Timestamp::default());
    }
}
