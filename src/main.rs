//! Obstacle Dash entry point
//!
//! Native builds play in the terminal; wasm builds start from `wasm_main`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    obstacle_dash::platform::web::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Obstacle Dash (terminal) starting...");

    let seed: u64 = rand::random();
    if let Err(e) = obstacle_dash::platform::terminal::run(seed) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
