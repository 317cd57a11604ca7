//! Drawing surface abstraction
//!
//! Frontends implement `Canvas`; the scene code only ever talks to this trait.

use glam::IVec2;

use crate::color::Color;
use crate::sim::{Obstacle, Player, Rect};

/// A line of text rendered and measured by a canvas, ready to blit
#[derive(Debug, Clone, PartialEq)]
pub struct TextSprite {
    pub text: String,
    pub color: Color,
    /// Width and height in screen pixels
    pub size: IVec2,
}

impl TextSprite {
    pub fn width(&self) -> i32 {
        self.size.x
    }
}

/// A rendering surface in logical screen coordinates
pub trait Canvas {
    type Error;

    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Pixel extent `text` occupies when blitted
    fn measure_text(&self, text: &str) -> IVec2;

    /// Place a rendered line with its top-left corner at `pos`
    fn blit(&mut self, sprite: &TextSprite, pos: IVec2);

    /// Show everything drawn since the last `clear`
    fn present(&mut self) -> Result<(), Self::Error>;

    fn render_text(&self, text: &str, color: Color) -> TextSprite {
        TextSprite {
            text: text.to_owned(),
            color,
            size: self.measure_text(text),
        }
    }
}

/// Anything that knows how to put itself on a canvas
pub trait Drawable {
    fn draw<C: Canvas>(&self, canvas: &mut C);
}

impl Drawable for Player {
    fn draw<C: Canvas>(&self, canvas: &mut C) {
        canvas.fill_rect(self.rect, self.color);
    }
}

impl Drawable for Obstacle {
    fn draw<C: Canvas>(&self, canvas: &mut C) {
        canvas.fill_rect(self.rect, self.color);
    }
}
