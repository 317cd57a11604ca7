//! Frontend-facing game session
//!
//! Wraps the simulation with key handling, restart and the best-times board.
//! Frontends call `frame` once per loop iteration.

use crate::highscores::HighScores;
use crate::platform::{InputEvent, Key, PressedKeys};
use crate::renderer::{Canvas, draw_frame};
use crate::sim::{GameEvent, GameState, TickInput, Timestamp, tick};
use crate::tuning::Tuning;

pub struct Game {
    pub state: GameState,
    pub high_scores: HighScores,
    /// 1-based session counter, bumped on every restart
    session: u32,
}

impl Game {
    pub fn new(seed: u64, now: Timestamp) -> Self {
        Self::with_tuning(seed, Tuning::default(), now)
    }

    pub fn with_tuning(seed: u64, tuning: Tuning, now: Timestamp) -> Self {
        log::info!("Game initialized with seed: {}", seed);
        Self {
            state: GameState::with_tuning(seed, tuning, now),
            high_scores: HighScores::new(),
            session: 1,
        }
    }

    pub fn session(&self) -> u32 {
        self.session
    }

    /// Process discrete input. Returns false once quit was requested.
    ///
    /// Restart is only honored after a game over.
    pub fn handle_events<I>(&mut self, events: I, now: Timestamp) -> bool
    where
        I: IntoIterator<Item = InputEvent>,
    {
        for event in events {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Key::Quit) => return false,
                InputEvent::KeyDown(Key::Restart) if self.state.is_game_over() => {
                    self.restart(now);
                }
                InputEvent::KeyDown(_) => {}
            }
        }
        true
    }

    /// Throw away the current run and start a fresh one at `now`
    pub fn restart(&mut self, now: Timestamp) {
        self.state.reset(now);
        self.session += 1;
        log::info!("Session {} started", self.session);
    }

    /// Advance the simulation with the currently held keys
    pub fn update(&mut self, pressed: &PressedKeys, now: Timestamp) -> Vec<GameEvent> {
        let input = TickInput {
            up: pressed.contains(&Key::Up),
            down: pressed.contains(&Key::Down),
        };
        let events = tick(&mut self.state, &input, now);

        for event in &events {
            if let GameEvent::Collision { survival_time } = *event {
                log::info!(
                    "Game over: session {} survived {:.1}s",
                    self.session,
                    survival_time
                );
                if self.high_scores.add_time(survival_time, self.session) == Some(1) {
                    log::info!("New best time: {:.1}s", survival_time);
                }
            }
        }

        events
    }

    /// Compose the current frame onto `canvas`
    pub fn draw<C: Canvas>(&self, canvas: &mut C, now: Timestamp) {
        draw_frame(canvas, &self.state, self.high_scores.best(), now);
    }

    /// One loop iteration: handle input, update, render and present.
    /// Returns `Ok(false)` when the player asked to quit.
    pub fn frame<C, I>(
        &mut self,
        events: I,
        pressed: &PressedKeys,
        canvas: &mut C,
        now: Timestamp,
    ) -> Result<bool, C::Error>
    where
        C: Canvas,
        I: IntoIterator<Item = InputEvent>,
    {
        if !self.handle_events(events, now) {
            return Ok(false);
        }
        self.update(pressed, now);
        self.draw(canvas, now);
        canvas.present()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::renderer::TextSprite;
    use crate::sim::{GamePhase, Obstacle, Rect};
    use glam::IVec2;

    #[derive(Default)]
    struct CountingCanvas {
        rects: usize,
        texts: Vec<String>,
        presented: usize,
    }

    impl Canvas for CountingCanvas {
        type Error = std::convert::Infallible;

        fn clear(&mut self, _color: Color) {
            self.rects = 0;
            self.texts.clear();
        }

        fn fill_rect(&mut self, _rect: Rect, _color: Color) {
            self.rects += 1;
        }

        fn measure_text(&self, text: &str) -> IVec2 {
            IVec2::new(text.len() as i32 * 8, 16)
        }

        fn blit(&mut self, sprite: &TextSprite, _pos: IVec2) {
            self.texts.push(sprite.text.clone());
        }

        fn present(&mut self) -> Result<(), Self::Error> {
            self.presented += 1;
            Ok(())
        }
    }

    const NO_EVENTS: [InputEvent; 0] = [];

    fn at(ticks_ms: u64) -> Timestamp {
        Timestamp::new(ticks_ms, 1000.0 + ticks_ms as f64 / 1000.0)
    }

    fn crash(game: &mut Game, now: Timestamp) {
        let tuning = game.state.tuning.clone();
        let y = game.state.player.rect.top();
        game.state.obstacles.push(Obstacle::at(99, IVec2::new(55, y), &tuning));
        game.update(&PressedKeys::new(), now);
        assert_eq!(game.state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_quit_stops_the_loop() {
        let mut game = Game::new(1, at(0));
        assert!(game.handle_events(NO_EVENTS, at(0)));
        assert!(!game.handle_events([InputEvent::Quit], at(0)));
        assert!(!game.handle_events([InputEvent::KeyDown(Key::Quit)], at(0)));
    }

    #[test]
    fn test_restart_ignored_while_playing() {
        let mut game = Game::new(1, at(0));
        game.state.player.rect.pos.y = 100;
        game.handle_events([InputEvent::KeyDown(Key::Restart)], at(500));
        assert_eq!(game.state.player.rect.top(), 100);
        assert_eq!(game.session(), 1);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut game = Game::new(1, at(0));
        crash(&mut game, at(4000));

        assert!(game.handle_events([InputEvent::KeyDown(Key::Restart)], at(6000)));
        assert_eq!(game.state.phase, GamePhase::Playing);
        assert!(game.state.obstacles.is_empty());
        assert_eq!(game.state.start_time, at(6000).wall_secs);
        assert_eq!(game.session(), 2);
    }

    #[test]
    fn test_held_keys_move_player() {
        let mut game = Game::new(1, at(0));
        let pressed = PressedKeys::from([Key::Down]);
        game.update(&pressed, at(16));
        assert_eq!(game.state.player.rect.top(), 293);
    }

    #[test]
    fn test_crash_records_best_time() {
        let mut game = Game::new(1, at(0));
        crash(&mut game, at(4000));
        assert_eq!(game.high_scores.best(), Some(4.0));

        game.restart(at(5000));
        crash(&mut game, at(7000));
        assert_eq!(game.high_scores.best(), Some(4.0));
        assert_eq!(game.high_scores.entries.len(), 2);
        assert_eq!(game.high_scores.entries[1].session, 2);
    }

    #[test]
    fn test_frame_draws_and_presents() {
        let mut game = Game::new(1, at(0));
        let mut canvas = CountingCanvas::default();

        let running = game.frame(NO_EVENTS, &PressedKeys::new(), &mut canvas, at(16));
        assert_eq!(running, Ok(true));
        assert_eq!(canvas.presented, 1);
        assert_eq!(canvas.rects, 1);
        assert_eq!(canvas.texts, vec!["Time: 0.0s".to_owned()]);

        let running = game.frame([InputEvent::Quit], &PressedKeys::new(), &mut canvas, at(32));
        assert_eq!(running, Ok(false));
        assert_eq!(canvas.presented, 1);
    }

    #[test]
    fn test_game_over_frame_shows_best() {
        let mut game = Game::new(1, at(0));
        crash(&mut game, at(2500));

        let mut canvas = CountingCanvas::default();
        game.frame(NO_EVENTS, &PressedKeys::new(), &mut canvas, at(3000)).unwrap();
        assert_eq!(canvas.texts.len(), 4);
        assert_eq!(canvas.texts[3], "Best: 2.5s");
    }
}
