//! Retro Arcade - six classic games on one shared game loop
//!
//! Core modules:
//! - `sim`: Scheduler, collision queries, grids, phase machine, scoring
//! - `games`: Breakout, Pac-Man, Pong, Snake, Space Invaders, Tetris
//! - `input`: Polled keyboard/pointer snapshot
//! - `platform`: Renderer/display boundaries (canvas on web, recording natively)
//! - `highscores`: Persistent high-score store boundary
//! - `session`: Wires one game to its scheduler, input and host surfaces

pub mod error;
pub mod games;
pub mod highscores;
pub mod input;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{ArcadeError, Result};
pub use games::{Game, GameKind};
pub use highscores::{MemoryScoreStore, ScoreStore};
pub use input::{InputState, Key, ListenerHandle};
pub use session::{Session, SessionBuilder};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Step length all per-game speeds are tuned against (60 steps per second)
    pub const REFERENCE_STEP_MS: f32 = 1000.0 / 60.0;
    /// Default fixed simulation rate
    pub const DEFAULT_STEP_HZ: u32 = 60;
    /// Maximum catch-up steps per host frame to prevent spiral of death
    pub const MAX_CATCH_UP_STEPS: u32 = 5;
    /// Largest frame delta fed to variable and gated games
    pub const MAX_FRAME_DELTA_MS: f64 = 250.0;
    /// Lives at the start of a run
    pub const STARTING_LIVES: u32 = 3;

    /// Font used for overlay text
    pub const OVERLAY_FONT: &str = "'Press Start 2P'";
}

/// Scale factor converting a per-reference-step speed into movement for `dt_ms`
#[inline]
pub fn step_scale(dt_ms: f32) -> f32 {
    dt_ms / consts::REFERENCE_STEP_MS
}
