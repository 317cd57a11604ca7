//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time arrives as explicit `Timestamp`s, never read from the system
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod entity;
pub mod rect;
pub mod state;
pub mod tick;

pub use entity::{Obstacle, Player};
pub use rect::Rect;
pub use state::{GamePhase, GameState, Timestamp};
pub use tick::{GameEvent, TickInput, tick};
