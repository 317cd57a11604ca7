//! Rendering module
//!
//! Presentation is a pure function of the game state: `scene` composes a
//! frame onto any `Canvas`. Browser builds add a WebGPU colored-quad pipeline.

pub mod canvas;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod pipeline;
#[cfg(target_arch = "wasm32")]
pub mod shapes;
#[cfg(target_arch = "wasm32")]
pub mod vertex;

pub use canvas::{Canvas, Drawable, TextSprite};
pub use scene::draw_frame;

#[cfg(target_arch = "wasm32")]
pub use pipeline::RenderState;
