//! Browser frontend
//!
//! Rectangles go through the WebGPU pipeline; text lines are absolutely
//! positioned DOM nodes inside `#overlay`, laid out in screen pixels on top of
//! `#canvas`. `requestAnimationFrame` drives the loop.

use std::cell::RefCell;
use std::rc::Rc;

use glam::IVec2;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlCanvasElement, KeyboardEvent};

use super::{Clock, InputEvent, Key, PressedKeys};
use crate::color::Color;
use crate::game::Game;
use crate::renderer::shapes::filled_rect;
use crate::renderer::vertex::Vertex;
use crate::renderer::{Canvas, RenderState, TextSprite};
use crate::sim::Rect;
use crate::tuning::Tuning;

/// Overlay font metrics (monospace)
const FONT_PX: i32 = 24;
const CHAR_WIDTH_PX: i32 = 14;

fn map_key(key: &str) -> Option<Key> {
    match key {
        "ArrowUp" => Some(Key::Up),
        "ArrowDown" => Some(Key::Down),
        "r" | "R" => Some(Key::Restart),
        "Escape" | "q" => Some(Key::Quit),
        _ => None,
    }
}

/// Keyboard state fed by DOM listeners, drained once per frame
#[derive(Debug, Default)]
pub struct WebInput {
    events: Vec<InputEvent>,
    held: PressedKeys,
}

impl WebInput {
    pub fn key_down(&mut self, key: Key, repeat: bool) {
        self.held.insert(key);
        if !repeat {
            self.events.push(match key {
                Key::Quit => InputEvent::Quit,
                other => InputEvent::KeyDown(other),
            });
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Focus lost: key-up events will never arrive
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn drain(&mut self) -> (Vec<InputEvent>, PressedKeys) {
        (std::mem::take(&mut self.events), self.held.clone())
    }
}

/// `performance.now()` ticks, `Date.now()` wall clock
pub struct WebClock {
    performance: web_sys::Performance,
    /// Earliest rAF timestamp at which the next frame may run
    next_frame_ms: f64,
}

impl WebClock {
    pub fn new(performance: web_sys::Performance) -> Self {
        Self {
            performance,
            next_frame_ms: 0.0,
        }
    }

    /// Whether enough time has passed for another frame
    pub fn ready(&self, raf_time: f64) -> bool {
        raf_time >= self.next_frame_ms
    }
}

impl Clock for WebClock {
    fn ticks_ms(&self) -> u64 {
        self.performance.now() as u64
    }

    fn wall_clock_secs(&self) -> f64 {
        js_sys::Date::now() / 1000.0
    }

    /// The browser can't block; later rAF callbacks are skipped until the
    /// period is up. 1 ms of slack absorbs vsync jitter.
    fn cap_frame_rate(&mut self, target_hz: u32) {
        let period = 1000.0 / target_hz.max(1) as f64;
        self.next_frame_ms = self.performance.now() + period - 1.0;
    }
}

/// GPU rectangles plus DOM text
pub struct WebCanvas {
    render_state: RenderState,
    document: Document,
    overlay: Element,
    clear_color: Color,
    vertices: Vec<Vertex>,
    labels: Vec<(TextSprite, IVec2)>,
    /// Labels currently in the DOM
    shown_labels: Vec<(TextSprite, IVec2)>,
}

impl WebCanvas {
    pub fn new(render_state: RenderState, document: Document, overlay: Element) -> Self {
        Self {
            render_state,
            document,
            overlay,
            clear_color: Color::BLACK,
            vertices: Vec::new(),
            labels: Vec::new(),
            shown_labels: Vec::new(),
        }
    }

    fn sync_overlay(&mut self) {
        if self.labels == self.shown_labels {
            return;
        }
        self.overlay.set_inner_html("");
        for (sprite, pos) in &self.labels {
            let el = match self.document.create_element("div") {
                Ok(el) => el,
                Err(e) => {
                    log::warn!("Overlay label not created: {:?}", e);
                    continue;
                }
            };
            el.set_text_content(Some(&sprite.text));
            let style = format!(
                "position:absolute;left:{}px;top:{}px;color:rgb({},{},{});",
                pos.x, pos.y, sprite.color.r, sprite.color.g, sprite.color.b
            );
            if let Err(e) = el.set_attribute("style", &style) {
                log::warn!("Overlay label not styled: {:?}", e);
            }
            if let Err(e) = self.overlay.append_child(&el) {
                log::warn!("Overlay label not attached: {:?}", e);
            }
        }
        self.shown_labels = self.labels.clone();
    }
}

impl Canvas for WebCanvas {
    type Error = wgpu::SurfaceError;

    fn clear(&mut self, color: Color) {
        self.clear_color = color;
        self.vertices.clear();
        self.labels.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.vertices.extend_from_slice(&filled_rect(rect, color));
    }

    fn measure_text(&self, text: &str) -> IVec2 {
        IVec2::new(text.chars().count() as i32 * CHAR_WIDTH_PX, FONT_PX)
    }

    fn blit(&mut self, sprite: &TextSprite, pos: IVec2) {
        self.labels.push((sprite.clone(), pos));
    }

    fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.sync_overlay();
        self.render_state.render(&self.vertices, self.clear_color)
    }
}

/// Everything the rAF callback needs
struct WebApp {
    game: Game,
    canvas: WebCanvas,
    clock: WebClock,
    input: Rc<RefCell<WebInput>>,
}

impl WebApp {
    /// Run one frame. Returns false when the loop should stop.
    fn step(&mut self) -> bool {
        let (events, pressed) = self.input.borrow_mut().drain();
        let now = self.clock.now();

        match self.game.frame(events, &pressed, &mut self.canvas, now) {
            Ok(running) => {
                self.clock.cap_frame_rate(self.game.state.tuning.target_fps);
                running
            }
            Err(wgpu::SurfaceError::Lost) => {
                self.canvas.render_state.reconfigure();
                true
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
                false
            }
            Err(e) => {
                log::warn!("Render error: {:?}", e);
                true
            }
        }
    }
}

pub async fn run() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

    log::info!("Obstacle Dash starting...");

    let window = web_sys::window().expect("no window");
    let document = window.document().expect("no document");
    let performance = window.performance().expect("no performance");

    let canvas: HtmlCanvasElement = document
        .get_element_by_id("canvas")
        .expect("no canvas")
        .dyn_into()
        .expect("not a canvas");
    let overlay = document.get_element_by_id("overlay").expect("no overlay");

    // Backing store at device resolution; CSS keeps the logical size
    let tuning = Tuning::default();
    let dpr = window.device_pixel_ratio();
    let width = (tuning.screen_width as f64 * dpr) as u32;
    let height = (tuning.screen_height as f64 * dpr) as u32;
    canvas.set_width(width);
    canvas.set_height(height);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });

    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .expect("Failed to create surface");

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .expect("Failed to get adapter");

    log::info!("Using adapter: {:?}", adapter.get_info().name);

    let screen = IVec2::new(tuning.screen_width, tuning.screen_height);
    let render_state = RenderState::new(surface, &adapter, width, height, screen).await;

    let clock = WebClock::new(performance);
    let seed = js_sys::Date::now() as u64;
    let input = Rc::new(RefCell::new(WebInput::default()));
    let app = Rc::new(RefCell::new(WebApp {
        game: Game::with_tuning(seed, tuning, clock.now()),
        canvas: WebCanvas::new(render_state, document, overlay),
        clock,
        input: input.clone(),
    }));

    setup_input_handlers(input);
    request_animation_frame(app);

    log::info!("Obstacle Dash running!");
}

fn setup_input_handlers(input: Rc<RefCell<WebInput>>) {
    let window = web_sys::window().expect("no window");

    // Key down
    {
        let input = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(key) = map_key(&event.key()) {
                // Arrows would scroll the page
                event.prevent_default();
                input.borrow_mut().key_down(key, event.repeat());
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Key up
    {
        let input = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(key) = map_key(&event.key()) {
                input.borrow_mut().key_up(key);
            }
        });
        let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Window blur (click outside)
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            input.borrow_mut().release_all();
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn request_animation_frame(app: Rc<RefCell<WebApp>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| {
        game_loop(app, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn game_loop(app: Rc<RefCell<WebApp>>, time: f64) {
    {
        let mut a = app.borrow_mut();
        if a.clock.ready(time) && !a.step() {
            log::info!("Stopped after {} session(s)", a.game.session());
            return;
        }
    }

    request_animation_frame(app);
}
