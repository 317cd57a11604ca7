//! Terminal frontend
//!
//! Draws the 800x600 playfield onto a character grid (one cell per
//! `CELL_SIZE` pixels) and reads keys through crossterm. Sets up the terminal,
//! runs the loop, and restores the terminal on exit (even on error).

use std::collections::HashMap;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{cursor, execute, queue, style, terminal};
use glam::IVec2;

use super::{Clock, InputEvent, Key, PressedKeys, SystemClock};
use crate::color::{Color, palette};
use crate::game::Game;
use crate::renderer::{Canvas, TextSprite};
use crate::sim::Rect;
use crate::tuning::Tuning;

/// Screen pixels covered by one character cell
pub const CELL_SIZE: IVec2 = IVec2::new(10, 20);

/// Without release events, a fresh press counts as held this long, covering
/// the keyboard's initial auto-repeat delay
const FIRST_PRESS_HOLD: Duration = Duration::from_millis(600);

/// Without release events, each auto-repeat extends the hold by this much
const REPEAT_HOLD: Duration = Duration::from_millis(120);

/// Grid dimensions (columns, rows) needed for the arena
pub fn grid_size(tuning: &Tuning) -> (u16, u16) {
    let cols = (tuning.screen_width + CELL_SIZE.x - 1) / CELL_SIZE.x;
    let rows = (tuning.screen_height + CELL_SIZE.y - 1) / CELL_SIZE.y;
    (cols as u16, rows as u16)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: palette::TEXT,
            bg: palette::BACKGROUND,
        }
    }
}

fn to_term_color(color: Color) -> style::Color {
    style::Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// A `Canvas` backed by a character grid, flushed to `out` as a diff
pub struct TerminalCanvas<W: Write> {
    out: W,
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
    /// What the terminal currently shows; `None` forces a redraw
    shown: Vec<Option<Cell>>,
}

impl<W: Write> TerminalCanvas<W> {
    pub fn new(out: W, cols: u16, rows: u16) -> Self {
        let len = cols as usize * rows as usize;
        Self {
            out,
            cols,
            rows,
            cells: vec![Cell::default(); len],
            shown: vec![None; len],
        }
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<Cell> {
        if col < self.cols && row < self.rows {
            Some(self.cells[row as usize * self.cols as usize + col as usize])
        } else {
            None
        }
    }

    /// Redraw every cell on the next `present`
    pub fn invalidate(&mut self) {
        self.shown.iter_mut().for_each(|c| *c = None);
    }

    /// Text of one grid row, for inspection
    pub fn row_text(&self, row: u16) -> String {
        (0..self.cols)
            .filter_map(|col| self.cell(col, row))
            .map(|c| c.ch)
            .collect()
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }
}

impl<W: Write> Canvas for TerminalCanvas<W> {
    type Error = io::Error;

    fn clear(&mut self, color: Color) {
        let blank = Cell {
            bg: color,
            ..Cell::default()
        };
        self.cells.iter_mut().for_each(|c| *c = blank);
    }

    /// Paints every cell the rectangle touches
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let col_start = rect.left().div_euclid(CELL_SIZE.x).max(0);
        let col_end = (rect.right() + CELL_SIZE.x - 1)
            .div_euclid(CELL_SIZE.x)
            .min(self.cols as i32);
        let row_start = rect.top().div_euclid(CELL_SIZE.y).max(0);
        let row_end = (rect.bottom() + CELL_SIZE.y - 1)
            .div_euclid(CELL_SIZE.y)
            .min(self.rows as i32);

        for row in row_start..row_end {
            for col in col_start..col_end {
                if let Some(i) = self.index(col, row) {
                    self.cells[i] = Cell {
                        ch: ' ',
                        fg: palette::TEXT,
                        bg: color,
                    };
                }
            }
        }
    }

    fn measure_text(&self, text: &str) -> IVec2 {
        IVec2::new(text.chars().count() as i32 * CELL_SIZE.x, CELL_SIZE.y)
    }

    fn blit(&mut self, sprite: &TextSprite, pos: IVec2) {
        let row = pos.y.div_euclid(CELL_SIZE.y);
        let first_col = pos.x.div_euclid(CELL_SIZE.x);
        for (offset, ch) in sprite.text.chars().enumerate() {
            if let Some(i) = self.index(first_col + offset as i32, row) {
                self.cells[i].ch = ch;
                self.cells[i].fg = sprite.color;
            }
        }
    }

    fn present(&mut self) -> io::Result<()> {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let i = row as usize * self.cols as usize + col as usize;
                let cell = self.cells[i];
                if self.shown[i] == Some(cell) {
                    continue;
                }
                queue!(
                    self.out,
                    cursor::MoveTo(col, row),
                    style::SetColors(style::Colors::new(
                        to_term_color(cell.fg),
                        to_term_color(cell.bg)
                    )),
                    style::Print(cell.ch),
                )?;
                self.shown[i] = Some(cell);
            }
        }
        queue!(self.out, style::ResetColor)?;
        self.out.flush()
    }
}

fn map_key(key: &KeyEvent) -> Option<Key> {
    match key.code {
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Key::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Key::Restart),
        KeyCode::Char('q') | KeyCode::Esc => Some(Key::Quit),
        _ => None,
    }
}

/// Keyboard state built from crossterm key events
pub struct TerminalInput {
    /// Key -> instant the hold lapses unless refreshed
    held: HashMap<Key, Instant>,
    /// Terminal sends release events (keyboard enhancement active)
    reports_release: bool,
    resized: bool,
}

impl TerminalInput {
    pub fn new(reports_release: bool) -> Self {
        Self {
            held: HashMap::new(),
            reports_release,
            resized: false,
        }
    }

    /// Drain every pending terminal event without blocking
    pub fn poll_events(&mut self) -> io::Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => events.extend(self.on_key(&key, Instant::now())),
                Event::Resize(_, _) => self.resized = true,
                _ => {}
            }
        }
        Ok(events)
    }

    /// True once after the terminal was resized
    pub fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.resized)
    }

    pub fn pressed_keys(&self) -> PressedKeys {
        self.pressed_at(Instant::now())
    }

    fn on_key(&mut self, key: &KeyEvent, at: Instant) -> Option<InputEvent> {
        let mapped = map_key(key)?;
        match key.kind {
            KeyEventKind::Release => {
                self.held.remove(&mapped);
                None
            }
            KeyEventKind::Repeat => {
                self.hold(mapped, at);
                None
            }
            KeyEventKind::Press => {
                self.hold(mapped, at);
                Some(match mapped {
                    Key::Quit => InputEvent::Quit,
                    other => InputEvent::KeyDown(other),
                })
            }
        }
    }

    /// Plain terminals report auto-repeats as presses, so a press while the
    /// key is still held counts as a repeat
    fn hold(&mut self, key: Key, at: Instant) {
        let repeating = self.held.get(&key).is_some_and(|until| at < *until);
        let window = if repeating { REPEAT_HOLD } else { FIRST_PRESS_HOLD };
        self.held.insert(key, at + window);
    }

    fn pressed_at(&self, now: Instant) -> PressedKeys {
        self.held
            .iter()
            .filter(|(_, until)| self.reports_release || now < **until)
            .map(|(key, _)| *key)
            .collect()
    }
}

/// Play in the current terminal until the player quits
pub fn run(seed: u64) -> Result<()> {
    let tuning = Tuning::default();
    let (cols, rows) = grid_size(&tuning);
    let (term_w, term_h) = terminal::size()?;
    if term_w < cols || term_h < rows {
        bail!(
            "Terminal too small: need {}x{}, have {}x{}",
            cols,
            rows,
            term_w,
            term_h,
        );
    }

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    let mut reports_release = false;
    let result = enter_screen(&mut stdout).and_then(|()| {
        reports_release = enable_release_events(&mut stdout);
        log::info!(
            "Terminal {}x{}, key release events: {}",
            term_w,
            term_h,
            reports_release
        );
        run_loop(&mut stdout, tuning, seed, reports_release)
    });

    // Always restore terminal state.
    if reports_release {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn enter_screen(out: &mut io::Stdout) -> Result<()> {
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::Clear(terminal::ClearType::All),
    )?;
    Ok(())
}

/// Ask for key release events. Falls back to hold emulation when the
/// terminal lacks support or refuses the flags.
fn enable_release_events(out: &mut io::Stdout) -> bool {
    terminal::supports_keyboard_enhancement().unwrap_or(false) && push_release_flags(out)
}

fn push_release_flags<W: Write>(out: &mut W) -> bool {
    match execute!(
        out,
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    ) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Keyboard enhancement unavailable: {}", e);
            false
        }
    }
}

fn run_loop(out: &mut io::Stdout, tuning: Tuning, seed: u64, reports_release: bool) -> Result<()> {
    let (cols, rows) = grid_size(&tuning);
    let target_fps = tuning.target_fps;

    let mut clock = SystemClock::new();
    let mut input = TerminalInput::new(reports_release);
    let mut canvas = TerminalCanvas::new(out, cols, rows);
    let mut game = Game::with_tuning(seed, tuning, clock.now());

    loop {
        let events = input.poll_events()?;
        if input.take_resized() {
            execute!(canvas.out, terminal::Clear(terminal::ClearType::All))?;
            canvas.invalidate();
        }

        let pressed = input.pressed_keys();
        if !game.frame(events, &pressed, &mut canvas, clock.now())? {
            break;
        }
        clock.cap_frame_rate(target_fps);
    }

    log::info!("Quit after {} session(s)", game.session());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> TerminalCanvas<Vec<u8>> {
        let (cols, rows) = grid_size(&Tuning::default());
        TerminalCanvas::new(Vec::new(), cols, rows)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    #[test]
    fn test_grid_covers_arena() {
        assert_eq!(grid_size(&Tuning::default()), (80, 30));
    }

    #[test]
    fn test_fill_rect_covers_touched_cells() {
        let mut canvas = canvas();
        canvas.clear(Color::BLACK);
        // Player: x 50..80, y 285..315
        canvas.fill_rect(Rect::new(50, 285, 30, 30), Color::BLUE);

        for col in 5..8 {
            for row in 14..16 {
                assert_eq!(canvas.cell(col, row).map(|c| c.bg), Some(Color::BLUE));
            }
        }
        assert_eq!(canvas.cell(4, 14).map(|c| c.bg), Some(Color::BLACK));
        assert_eq!(canvas.cell(8, 14).map(|c| c.bg), Some(Color::BLACK));
        assert_eq!(canvas.cell(5, 16).map(|c| c.bg), Some(Color::BLACK));
    }

    #[test]
    fn test_fill_rect_clips_at_edges() {
        let mut canvas = canvas();
        canvas.clear(Color::BLACK);
        canvas.fill_rect(Rect::new(-40, 0, 80, 80), Color::RED);
        canvas.fill_rect(Rect::new(795, 520, 80, 80), Color::RED);

        assert_eq!(canvas.cell(0, 0).map(|c| c.bg), Some(Color::RED));
        assert_eq!(canvas.cell(3, 3).map(|c| c.bg), Some(Color::RED));
        assert_eq!(canvas.cell(4, 0).map(|c| c.bg), Some(Color::BLACK));
        assert_eq!(canvas.cell(79, 29).map(|c| c.bg), Some(Color::RED));
    }

    #[test]
    fn test_blit_writes_text_over_background() {
        let mut canvas = canvas();
        canvas.clear(Color::BLACK);
        let sprite = canvas.render_text("Time: 1.0s", Color::WHITE);
        assert_eq!(sprite.size, IVec2::new(100, 20));

        canvas.blit(&sprite, IVec2::new(10, 10));
        assert!(canvas.row_text(0).starts_with(" Time: 1.0s "));
        assert_eq!(canvas.cell(1, 0).map(|c| c.fg), Some(Color::WHITE));
    }

    #[test]
    fn test_present_only_writes_changes() {
        let mut canvas = canvas();
        canvas.clear(Color::BLACK);
        canvas.present().unwrap();
        let first = canvas.out.len();
        assert!(first > 0);

        canvas.clear(Color::BLACK);
        canvas.present().unwrap();
        let unchanged = canvas.out.len() - first;

        canvas.fill_rect(Rect::new(0, 0, 10, 20), Color::RED);
        canvas.present().unwrap();
        let one_cell = canvas.out.len() - first - unchanged;

        assert!(unchanged < one_cell);
        assert!(one_cell < first);
    }

    #[test]
    fn test_key_mapping() {
        let mut input = TerminalInput::new(true);
        let now = Instant::now();
        assert_eq!(
            input.on_key(&press(KeyCode::Char('r')), now),
            Some(InputEvent::KeyDown(Key::Restart))
        );
        assert_eq!(input.on_key(&press(KeyCode::Esc), now), Some(InputEvent::Quit));
        assert_eq!(input.on_key(&press(KeyCode::Char('q')), now), Some(InputEvent::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(input.on_key(&ctrl_c, now), Some(InputEvent::Quit));
        assert_eq!(input.on_key(&press(KeyCode::Char('x')), now), None);
    }

    #[test]
    fn test_release_events_end_hold() {
        let mut input = TerminalInput::new(true);
        let start = Instant::now();
        input.on_key(&press(KeyCode::Up), start);
        let later = start + Duration::from_secs(2);
        assert!(input.pressed_at(later).contains(&Key::Up));

        let release = KeyEvent::new_with_kind(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Release);
        input.on_key(&release, later);
        assert!(input.pressed_at(later).is_empty());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_release_flags_fall_back_on_write_error() {
        assert!(!push_release_flags(&mut BrokenPipe));

        let mut out = Vec::new();
        assert!(push_release_flags(&mut out));
        assert!(!out.is_empty());
    }

    #[test]
    fn test_hold_spans_initial_repeat_delay() {
        let mut input = TerminalInput::new(false);
        let start = Instant::now();
        input.on_key(&press(KeyCode::Up), start);

        // No events arrive until the first auto-repeat at 500 ms
        let dropped = (0..32u64)
            .map(|frame| start + Duration::from_millis(frame * 16))
            .filter(|at| !input.pressed_at(*at).contains(&Key::Up))
            .count();
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_hold_expires_after_repeats_stop() {
        let mut input = TerminalInput::new(false);
        let start = Instant::now();
        input.on_key(&press(KeyCode::Down), start);

        // Plain terminals deliver auto-repeats as presses
        let mut last = start;
        for ms in (500..=800).step_by(33) {
            last = start + Duration::from_millis(ms);
            input.on_key(&press(KeyCode::Down), last);
        }
        assert!(input.pressed_at(last + Duration::from_millis(100)).contains(&Key::Down));
        assert!(input.pressed_at(last + Duration::from_millis(150)).is_empty());

        // A fresh press after the key lapsed gets the long window again
        let again = last + Duration::from_secs(1);
        input.on_key(&press(KeyCode::Down), again);
        assert!(input.pressed_at(again + Duration::from_millis(400)).contains(&Key::Down));
    }

    #[test]
    fn test_repeat_events_extend_hold() {
        let mut input = TerminalInput::new(false);
        let start = Instant::now();
        input.on_key(&press(KeyCode::Down), start);

        let repeat = KeyEvent::new_with_kind(KeyCode::Down, KeyModifiers::NONE, KeyEventKind::Repeat);
        input.on_key(&repeat, start + Duration::from_millis(550));
        assert!(input.pressed_at(start + Duration::from_millis(650)).contains(&Key::Down));
        assert!(input.pressed_at(start + Duration::from_millis(700)).is_empty());
    }
}
