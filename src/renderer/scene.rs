//! Frame composition: entities plus the HUD overlay

use glam::IVec2;

use super::canvas::{Canvas, Drawable};
use crate::color::palette;
use crate::sim::{GameState, Timestamp};

/// Top-left corner of the running timer
pub const TIMER_POS: IVec2 = IVec2::new(10, 10);
/// Vertical distance between game-over lines
const LINE_SPACING: i32 = 50;

pub fn timer_text(elapsed: f64) -> String {
    format!("Time: {elapsed:.1}s")
}

pub fn survival_text(survival_time: f64) -> String {
    format!("You survived for {survival_time:.1} seconds!")
}

pub fn best_text(best: f64) -> String {
    format!("Best: {best:.1}s")
}

pub const GAME_OVER_TEXT: &str = "GAME OVER";
pub const RESTART_TEXT: &str = "Press R to restart";

/// Draw one full frame of `state` onto `canvas` (without presenting it).
///
/// `best` is the longest survival time so far, shown under the game-over text.
pub fn draw_frame<C: Canvas>(
    canvas: &mut C,
    state: &GameState,
    best: Option<f64>,
    now: Timestamp,
) {
    canvas.clear(palette::BACKGROUND);

    state.player.draw(canvas);
    for obstacle in &state.obstacles {
        obstacle.draw(canvas);
    }

    match state.survival_time {
        None => {
            let sprite = canvas.render_text(&timer_text(state.elapsed(now)), palette::TEXT);
            canvas.blit(&sprite, TIMER_POS);
        }
        Some(survival_time) => {
            let center_x = state.tuning.screen_width / 2;
            let center_y = state.tuning.screen_height / 2;

            let mut lines = vec![
                GAME_OVER_TEXT.to_owned(),
                survival_text(survival_time),
                RESTART_TEXT.to_owned(),
            ];
            if let Some(best) = best {
                lines.push(best_text(best));
            }

            for (i, line) in lines.iter().enumerate() {
                let sprite = canvas.render_text(line, palette::TEXT);
                let y = center_y - LINE_SPACING + i as i32 * LINE_SPACING;
                canvas.blit(&sprite, IVec2::new(center_x - sprite.width() / 2, y));
            }
        }
    }
}
