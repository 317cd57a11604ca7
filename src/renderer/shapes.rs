//! Shape generation for 2D primitives

use super::vertex::Vertex;
use crate::color::Color;
use crate::sim::Rect;

/// Two triangles covering `rect`, in screen pixels
pub fn filled_rect(rect: Rect, color: Color) -> [Vertex; 6] {
    let (l, t) = (rect.left() as f32, rect.top() as f32);
    let (r, b) = (rect.right() as f32, rect.bottom() as f32);
    [
        Vertex::new(l, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, t, color),
        Vertex::new(r, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, b, color),
    ]
}
