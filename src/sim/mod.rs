//! Shared simulation core
//!
//! Everything the six games have in common. This module is pure:
//! - Time only arrives through `Scheduler::tick` / `update(dt)`
//! - Randomness is injected by the caller (seeded `Pcg32`)
//! - No rendering, storage or DOM access; those are boundaries in `platform`

pub mod collision;
pub mod grid;
pub mod phase;
pub mod rect;
pub mod scheduler;
pub mod score;

pub use collision::{
    Axis, bounce_axis, cell_at, circle_overlaps_rect, hit_offset, overlap, reflect,
};
pub use grid::{Cell, CellStatus, Direction, Grid, GridCell, GridMover};
pub use phase::{GamePhase, PhaseMachine};
pub use rect::Rect;
pub use scheduler::{RunState, Scheduler, Simulatable, StepMode, TickReport};
pub use score::{ScoreState, Scoreboard};
