//! Obstacle Dash - A single-screen arcade avoidance game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, spawning, collisions, game state)
//! - `renderer`: Presentation of the current state onto a `Canvas`
//! - `platform`: Terminal/browser collaborators (input, timing, drawing)
//! - `tuning`: Data-driven game balance

pub mod color;
pub mod game;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use color::Color;
pub use game::Game;
pub use highscores::HighScores;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Logical screen dimensions
    pub const SCREEN_WIDTH: i32 = 800;
    pub const SCREEN_HEIGHT: i32 = 600;

    /// Player defaults - the player never leaves its column
    pub const PLAYER_X: i32 = 50;
    pub const PLAYER_SIZE: i32 = 30;
    /// Vertical movement per frame while a direction key is held
    pub const PLAYER_SPEED: i32 = 8;

    /// Obstacle defaults
    pub const OBSTACLE_SIZE: i32 = 80;
    /// Leftward movement per frame
    pub const OBSTACLE_SPEED: i32 = 5;
    /// Monotonic milliseconds between spawns
    pub const SPAWN_INTERVAL_MS: u64 = 1500;

    /// Frame-rate cap for the main loop
    pub const TARGET_FPS: u32 = 60;
}
