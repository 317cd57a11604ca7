//! Platform abstraction layer
//!
//! Handles terminal/browser differences for:
//! - Time/ticks and frame pacing
//! - Input events and held keys
//! - Drawing (each frontend provides a `renderer::Canvas`)

use std::collections::HashSet;

use crate::sim::Timestamp;

#[cfg(not(target_arch = "wasm32"))]
pub mod terminal;
#[cfg(target_arch = "wasm32")]
pub mod web;

/// Logical keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Restart,
    Quit,
}

/// Discrete input from the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Window closed or quit requested
    Quit,
    KeyDown(Key),
}

/// Keys held down right now
pub type PressedKeys = HashSet<Key>;

/// Time source and loop pacing
pub trait Clock {
    /// Monotonic milliseconds since an arbitrary origin
    fn ticks_ms(&self) -> u64;

    /// Seconds since the Unix epoch
    fn wall_clock_secs(&self) -> f64;

    /// Block until at least one `1 / target_hz` period has passed since the
    /// previous call
    fn cap_frame_rate(&mut self, target_hz: u32);

    fn now(&self) -> Timestamp {
        Timestamp::new(self.ticks_ms(), self.wall_clock_secs())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native_clock::SystemClock;

#[cfg(not(target_arch = "wasm32"))]
mod native_clock {
    use std::thread;
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    use super::Clock;

    /// `std::time` backed clock
    pub struct SystemClock {
        origin: Instant,
        last_frame: Option<Instant>,
    }

    impl SystemClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                last_frame: None,
            }
        }
    }

    impl Default for SystemClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for SystemClock {
        fn ticks_ms(&self) -> u64 {
            self.origin.elapsed().as_millis() as u64
        }

        fn wall_clock_secs(&self) -> f64 {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0)
        }

        fn cap_frame_rate(&mut self, target_hz: u32) {
            let period = Duration::from_secs_f64(1.0 / target_hz.max(1) as f64);
            if let Some(last) = self.last_frame {
                let elapsed = last.elapsed();
                if elapsed < period {
                    thread::sleep(period - elapsed);
                }
            }
            self.last_frame = Some(Instant::now());
        }
    }

}
