//! Browser host: 2d canvas, LocalStorage scores, DOM HUD and event wiring

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent,
    Storage,
};

use super::{Color, Display, HudField, Renderer, TextStyle};
use crate::error::{ArcadeError, Result};
use crate::games::GameKind;
use crate::highscores::{ScoreStore, parse_stored_score};
use crate::input::{Key, ListenerHandle};
use crate::session::Session;
use crate::settings::Settings;
use crate::sim::{GamePhase, Rect};

/// Draws through a canvas 2d context
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(ArcadeError::MissingCapability("canvas 2d context"))?;
        Ok(Self {
            ctx,
            width: canvas.width() as f64,
            height: canvas.height() as f64,
        })
    }
}

impl Renderer for CanvasRenderer {
    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(rect.x as f64, rect.y as f64, rect.width as f64, rect.height as f64);
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, style: TextStyle) {
        self.ctx.set_font(&format!("{}px {}", style.size, style.font));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(&style.color.to_css());
        let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
    }
}

/// High scores in `window.localStorage`
pub struct LocalStorageScores {
    storage: Storage,
}

impl LocalStorageScores {
    pub fn new() -> Result<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(ArcadeError::MissingCapability("localStorage"))?;
        Ok(Self { storage })
    }
}

impl ScoreStore for LocalStorageScores {
    fn get(&self, key: &str) -> Option<u64> {
        let raw = self.storage.get_item(key).ok().flatten()?;
        parse_stored_score(&raw)
    }

    fn set(&mut self, key: &str, value: u64) -> Result<()> {
        self.storage
            .set_item(key, &value.to_string())
            .map_err(|e| ArcadeError::Storage(format!("{:?}", e)))
    }
}

/// Writes HUD fields into elements by id; missing elements are skipped
pub struct DomDisplay {
    document: Document,
}

impl DomDisplay {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl Display for DomDisplay {
    fn set_field(&mut self, field: HudField, value: u64) {
        if let Some(el) = self.document.get_element_by_id(field.element_id()) {
            el.set_text_content(Some(&value.to_string()));
        }
    }
}

type Handler = Closure<dyn FnMut(web_sys::Event)>;

/// Registered DOM listeners, removed together
#[derive(Default)]
struct Listeners {
    entries: Vec<(EventTarget, &'static str, Handler)>,
}

impl Listeners {
    fn add(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<()> {
        let closure = Handler::new(handler);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|_| ArcadeError::MissingCapability("addEventListener"))?;
        self.entries.push((target.clone(), event, closure));
        Ok(())
    }

    fn into_handle(self) -> ListenerHandle {
        ListenerHandle::new(move || {
            for (target, event, closure) in self.entries {
                let _ = target
                    .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            }
        })
    }
}

/// Keys whose browser default (scrolling) is suppressed
fn is_game_key(key: Key) -> bool {
    matches!(
        key,
        Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight | Key::Space
    )
}

fn pause_label(phase: GamePhase) -> &'static str {
    if phase == GamePhase::Paused { "Resume" } else { "Pause" }
}

fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

fn wire(session: &Rc<RefCell<Session>>, document: &Document, canvas: &HtmlCanvasElement) -> Result<Listeners> {
    let window = web_sys::window().ok_or(ArcadeError::MissingCapability("window"))?;
    let mut listeners = Listeners::default();

    // Keyboard
    {
        let session = session.clone();
        listeners.add(&window, "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if let Some(key) = Key::from_dom_key(&event.key()) {
                if is_game_key(key) {
                    event.prevent_default();
                }
                session.borrow_mut().key_down(key);
            }
        })?;
    }
    {
        let session = session.clone();
        listeners.add(&window, "keyup", move |event| {
            if let Some(key) = event
                .dyn_ref::<KeyboardEvent>()
                .and_then(|e| Key::from_dom_key(&e.key()))
            {
                session.borrow_mut().key_up(key);
            }
        })?;
    }

    // Pointer, in canvas pixels
    {
        let session = session.clone();
        let canvas_el = canvas.clone();
        listeners.add(canvas, "mousemove", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                let bounds = canvas_el.get_bounding_client_rect();
                let scale_x = canvas_el.width() as f64 / bounds.width().max(1.0);
                let scale_y = canvas_el.height() as f64 / bounds.height().max(1.0);
                let x = (event.client_x() as f64 - bounds.left()) * scale_x;
                let y = (event.client_y() as f64 - bounds.top()) * scale_y;
                session.borrow_mut().pointer_move(x as f32, y as f32);
            }
        })?;
    }
    {
        let session = session.clone();
        listeners.add(canvas, "mousedown", move |_| session.borrow_mut().pointer_down())?;
    }
    {
        let session = session.clone();
        listeners.add(&window, "mouseup", move |_| session.borrow_mut().pointer_up())?;
    }

    // Buttons
    if let Some(button) = document.get_element_by_id("startButton") {
        let session = session.clone();
        let doc = document.clone();
        listeners.add(&button, "click", move |_| {
            let mut s = session.borrow_mut();
            s.start();
            set_text(&doc, "startButton", "Restart Game");
            set_text(&doc, "pauseButton", pause_label(s.phase()));
        })?;
    }
    if let Some(button) = document.get_element_by_id("pauseButton") {
        let session = session.clone();
        let doc = document.clone();
        listeners.add(&button, "click", move |_| {
            let mut s = session.borrow_mut();
            s.toggle_pause();
            set_text(&doc, "pauseButton", pause_label(s.phase()));
        })?;
    }

    // Suspend while the tab is hidden
    {
        let session = session.clone();
        let doc = document.clone();
        listeners.add(document, "visibilitychange", move |_| {
            let mut s = session.borrow_mut();
            if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                s.suspend();
            } else {
                s.resume();
            }
        })?;
    }

    Ok(listeners)
}

fn request_frame(session: Rc<RefCell<Session>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |now: f64| run_frame(session, now));
    if window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .is_ok()
    {
        closure.forget();
    }
}

fn run_frame(session: Rc<RefCell<Session>>, now: f64) {
    let report = session.borrow_mut().frame(now);
    match report {
        Ok(report) if report.rearm => request_frame(session),
        Ok(_) => log::info!("animation loop stopped"),
        Err(e) => log::error!("frame failed: {}", e),
    }
}

/// Build the game named by the canvas `data-game` attribute, wire the page
/// and start the animation loop
pub fn mount(canvas_id: &str) -> Result<Rc<RefCell<Session>>> {
    let window = web_sys::window().ok_or(ArcadeError::MissingCapability("window"))?;
    let document = window
        .document()
        .ok_or(ArcadeError::MissingCapability("document"))?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .and_then(|el| el.dyn_into().ok())
        .ok_or(ArcadeError::MissingCapability("canvas"))?;

    let kind: GameKind = canvas
        .get_attribute("data-game")
        .ok_or(ArcadeError::MissingCapability("data-game attribute"))?
        .parse()?;

    let session = Session::builder(kind)
        .settings(Settings::load())
        .renderer(CanvasRenderer::new(&canvas)?)
        .store(LocalStorageScores::new()?)
        .display(DomDisplay::new(document.clone()))
        .build()?;
    let session = Rc::new(RefCell::new(session));

    let listeners = wire(&session, &document, &canvas)?;
    session.borrow_mut().attach_listeners(listeners.into_handle());

    request_frame(session.clone());
    log::info!("{} mounted on #{}", kind, canvas_id);
    Ok(session)
}
