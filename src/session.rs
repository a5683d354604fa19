//! A running game wired to its scheduler, input snapshot and host surfaces
//!
//! The host owns one `Session` per canvas. It forwards raw input events,
//! calls `frame()` once per display refresh and re-requests a frame while
//! the returned report says to.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::error::{ArcadeError, Result};
use crate::games::{Game, GameKind, Hooks};
use crate::highscores::ScoreStore;
use crate::input::{InputState, Key, ListenerHandle};
use crate::platform::{Display, Renderer};
use crate::settings::Settings;
use crate::sim::{GamePhase, RunState, ScoreState, Scheduler, Simulatable, TickReport};

/// The scheduler's view of a session for the duration of one tick
struct Frame<'a> {
    game: &'a mut dyn Game,
    input: &'a mut InputState,
    renderer: &'a mut dyn Renderer,
}

impl Simulatable for Frame<'_> {
    fn update(&mut self, dt_ms: f32) -> Result<()> {
        self.game.update(dt_ms, self.input)?;
        // edges are seen by exactly one step
        self.input.end_frame();
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        self.game.render(self.renderer);
        Ok(())
    }
}

/// Collects a session's collaborators; every one is required
pub struct SessionBuilder {
    kind: GameKind,
    settings: Settings,
    renderer: Option<Box<dyn Renderer>>,
    store: Option<Box<dyn ScoreStore>>,
    display: Option<Box<dyn Display>>,
    seed: Option<u64>,
}

impl SessionBuilder {
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn store(mut self, store: impl ScoreStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn display(mut self, display: impl Display + 'static) -> Self {
        self.display = Some(Box::new(display));
        self
    }

    /// Overrides `Settings::seed`
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the game in its menu and start the scheduler
    pub fn build(self) -> Result<Session> {
        self.settings.validate()?;
        let renderer = self.renderer.ok_or(ArcadeError::MissingCapability("renderer"))?;
        let store = self.store.ok_or(ArcadeError::MissingCapability("score store"))?;
        let display = self.display.ok_or(ArcadeError::MissingCapability("display"))?;

        let seed = self.seed.or(self.settings.seed).unwrap_or_else(clock_seed);
        let game = self
            .kind
            .build(Hooks { store, display }, &self.settings, Pcg32::seed_from_u64(seed));

        let mut scheduler = Scheduler::new(game.step_mode())
            .with_limits(self.settings.max_catch_up_steps, self.settings.max_frame_delta_ms);
        scheduler.start();
        log::info!("{} session ready (seed {})", self.kind, seed);

        Ok(Session {
            game,
            scheduler,
            input: InputState::new(),
            renderer,
            listeners: None,
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

pub struct Session {
    game: Box<dyn Game>,
    scheduler: Scheduler,
    input: InputState,
    renderer: Box<dyn Renderer>,
    listeners: Option<ListenerHandle>,
}

impl Session {
    pub fn builder(kind: GameKind) -> SessionBuilder {
        SessionBuilder {
            kind,
            settings: Settings::default(),
            renderer: None,
            store: None,
            display: None,
            seed: None,
        }
    }

    pub fn kind(&self) -> GameKind {
        self.game.kind()
    }

    pub fn phase(&self) -> GamePhase {
        self.game.phase()
    }

    pub fn score(&self) -> Option<ScoreState> {
        self.game.score()
    }

    pub fn run_state(&self) -> RunState {
        self.scheduler.state()
    }

    pub fn total_steps(&self) -> u64 {
        self.scheduler.total_steps()
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn game(&self) -> &dyn Game {
        self.game.as_ref()
    }

    /// One host refresh at `now_ms`
    pub fn frame(&mut self, now_ms: f64) -> Result<TickReport> {
        let mut frame = Frame {
            game: self.game.as_mut(),
            input: &mut self.input,
            renderer: self.renderer.as_mut(),
        };
        self.scheduler.tick(now_ms, &mut frame)
    }

    // === Control actions ===

    /// Start (or restart) a fresh run
    pub fn start(&mut self) {
        log::info!("{}: start", self.game.kind());
        self.input.release_all();
        self.game.start();
    }

    /// User pause toggle; the overlay keeps rendering
    pub fn toggle_pause(&mut self) -> bool {
        let changed = self.game.toggle_pause();
        if changed {
            log::info!("{}: {}", self.game.kind(), self.game.phase().label());
        }
        changed
    }

    /// Host went away (tab hidden): stop stepping and rendering
    pub fn suspend(&mut self) {
        if self.scheduler.is_running() {
            log::info!("{}: suspended", self.game.kind());
        }
        self.scheduler.pause();
        self.input.release_all();
    }

    pub fn resume(&mut self) {
        self.scheduler.resume();
    }

    /// Deregister from the host; later frames do nothing and do not re-arm
    pub fn stop(&mut self) {
        log::info!("{}: stopped", self.game.kind());
        self.scheduler.stop();
    }

    /// Stop and detach host listeners
    pub fn dispose(&mut self) {
        self.stop();
        if let Some(mut listeners) = self.listeners.take() {
            listeners.dispose();
        }
    }

    /// Keep the host listeners alive for as long as the session
    pub fn attach_listeners(&mut self, handle: ListenerHandle) {
        if let Some(mut old) = self.listeners.replace(handle) {
            old.dispose();
        }
    }

    pub fn has_listeners(&self) -> bool {
        self.listeners.as_ref().is_some_and(|l| l.is_attached())
    }

    // === Host input ===

    /// Key press. P/Escape toggle pause, Enter starts from the menu or after
    /// a game over, R restarts after a game over. Every key also reaches the
    /// game's input snapshot.
    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Escape | Key::Char('p') => {
                self.toggle_pause();
            }
            Key::Enter if matches!(self.phase(), GamePhase::Menu | GamePhase::GameOver) => {
                self.start();
            }
            Key::Char('r') if self.phase() == GamePhase::GameOver => {
                self.start();
            }
            _ => {}
        }
        self.input.key_down(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.input.key_up(key);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.input.pointer_move(x, y);
    }

    pub fn pointer_down(&mut self) {
        self.input.pointer_down();
    }

    pub fn pointer_up(&mut self) {
        self.input.pointer_up();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("kind", &self.game.kind())
            .field("phase", &self.game.phase())
            .field("scheduler", &self.scheduler)
            .field("listeners", &self.listeners)
            .finish()
    }
}
