//! Per-frame simulation step
//!
//! Core game loop that advances the simulation by one frame.

use serde::{Deserialize, Serialize};

use super::state::{GamePhase, GameState, Timestamp};

/// Held direction keys for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ObstacleSpawned { id: u32 },
    /// The player hit an obstacle; the run is over
    Collision { survival_time: f64 },
}

/// Advance the game state by one frame.
///
/// No-op once the run is over. Otherwise: move the player, spawn at most one
/// obstacle if the spawn interval has elapsed, then advance every obstacle,
/// dropping the ones that left the screen and checking each against the
/// player.
pub fn tick(state: &mut GameState, input: &TickInput, now: Timestamp) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if state.phase == GamePhase::GameOver {
        return events;
    }

    state.player.update(input);

    // No catch-up: a long frame still spawns only once
    let since_spawn = now.ticks_ms.saturating_sub(state.last_spawn_ticks);
    if since_spawn > state.tuning.spawn_interval_ms {
        let id = state.spawn_obstacle();
        state.last_spawn_ticks = now.ticks_ms;
        log::debug!("Spawned obstacle {} at tick {}", id, now.ticks_ms);
        events.push(GameEvent::ObstacleSpawned { id });
    }

    // Every obstacle advances even after a hit in the same pass
    let player = state.player.rect;
    let mut hit = false;
    state.obstacles.retain_mut(|obstacle| {
        obstacle.update();
        if obstacle.rect.intersects(&player) {
            hit = true;
        }
        !obstacle.is_off_screen()
    });

    if hit {
        let survival_time = now.wall_secs - state.start_time;
        state.survival_time = Some(survival_time);
        state.phase = GamePhase::GameOver;
        events.push(GameEvent::Collision { survival_time });
    }

    events
}
