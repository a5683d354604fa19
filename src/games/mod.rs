//! The six titles and the trait the session drives them through
//!
//! Every game owns its world outright (movers, layout grid, scalars, phase)
//! and receives its host collaborators through `Hooks` at construction.

pub mod breakout;
pub mod invaders;
pub mod pacman;
pub mod pong;
pub mod snake;
pub mod tetris;

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use rand_pcg::Pcg32;

pub use breakout::Breakout;
pub use invaders::SpaceInvaders;
pub use pacman::PacMan;
pub use pong::Pong;
pub use snake::Snake;
pub use tetris::Tetris;

use crate::error::{ArcadeError, Result};
use crate::highscores::ScoreStore;
use crate::input::InputState;
use crate::platform::{Color, Display, Renderer, overlay_text};
use crate::settings::Settings;
use crate::sim::{GamePhase, ScoreState, StepMode};

/// One playable title
pub trait Game {
    fn kind(&self) -> GameKind;

    /// How the scheduler should step this game
    fn step_mode(&self) -> StepMode;

    fn phase(&self) -> GamePhase;

    /// Advance one step. Does nothing unless the phase is `Playing`.
    fn update(&mut self, dt_ms: f32, input: &InputState) -> Result<()>;

    /// Draw the current frame, overlays included
    fn render(&self, out: &mut dyn Renderer);

    /// Start request: always a fresh run, whatever the current phase
    fn start(&mut self);

    /// Pause toggle request; returns whether the phase changed
    fn toggle_pause(&mut self) -> bool;

    /// Score/lives/level snapshot, for titles that keep one
    fn score(&self) -> Option<ScoreState> {
        None
    }
}

/// Host collaborators handed to a game at construction
pub struct Hooks {
    pub store: Box<dyn ScoreStore>,
    pub display: Box<dyn Display>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hooks { .. }")
    }
}

/// Which title to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    Breakout,
    PacMan,
    Pong,
    Snake,
    SpaceInvaders,
    Tetris,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        GameKind::Breakout,
        GameKind::PacMan,
        GameKind::Pong,
        GameKind::Snake,
        GameKind::SpaceInvaders,
        GameKind::Tetris,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GameKind::Breakout => "breakout",
            GameKind::PacMan => "pacman",
            GameKind::Pong => "pong",
            GameKind::Snake => "snake",
            GameKind::SpaceInvaders => "spaceinvaders",
            GameKind::Tetris => "tetris",
        }
    }

    /// Key of the persisted high score; Pong keeps none
    pub fn storage_key(self) -> Option<&'static str> {
        match self {
            GameKind::Breakout => Some("breakoutHighScore"),
            GameKind::PacMan => Some("pacmanHighScore"),
            GameKind::Pong => None,
            GameKind::Snake => Some("snakeHighScore"),
            GameKind::SpaceInvaders => Some("spaceInvadersHighScore"),
            GameKind::Tetris => Some("tetrisHighScore"),
        }
    }

    /// Construct the game in its `Menu` phase
    pub fn build(self, hooks: Hooks, settings: &Settings, rng: Pcg32) -> Box<dyn Game> {
        log::info!("building {}", self.name());
        match self {
            GameKind::Breakout => Box::new(Breakout::new(hooks, settings)),
            GameKind::PacMan => Box::new(PacMan::new(hooks, settings, rng)),
            GameKind::Pong => Box::new(Pong::new(hooks, settings, rng)),
            GameKind::Snake => Box::new(Snake::new(hooks, settings, rng)),
            GameKind::SpaceInvaders => Box::new(SpaceInvaders::new(hooks, settings, rng)),
            GameKind::Tetris => Box::new(Tetris::new(hooks, settings, rng)),
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameKind {
    type Err = ArcadeError;

    fn from_str(s: &str) -> Result<Self> {
        let norm: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match norm.as_str() {
            "breakout" => Ok(GameKind::Breakout),
            "pacman" => Ok(GameKind::PacMan),
            "pong" => Ok(GameKind::Pong),
            "snake" => Ok(GameKind::Snake),
            "spaceinvaders" | "invaders" => Ok(GameKind::SpaceInvaders),
            "tetris" => Ok(GameKind::Tetris),
            _ => Err(ArcadeError::UnknownGame(s.to_string())),
        }
    }
}

/// Standard menu / paused / game-over overlay, centred on the field
pub(crate) fn draw_phase_overlay(out: &mut dyn Renderer, phase: GamePhase, title: &str, size: Vec2) {
    let center = size * 0.5;
    match phase {
        GamePhase::Menu => {
            overlay_text(out, title, center - Vec2::new(0.0, 50.0), Color::YELLOW, 32.0);
            overlay_text(out, "Press START or ENTER", center + Vec2::new(0.0, 50.0), Color::WHITE, 16.0);
        }
        GamePhase::Paused => {
            overlay_text(out, "PAUSED", center, Color::WHITE, 30.0);
        }
        GamePhase::GameOver => {
            overlay_text(out, "GAME OVER", center, Color::RED, 30.0);
            overlay_text(out, "Press R to restart", center + Vec2::new(0.0, 40.0), Color::WHITE, 16.0);
        }
        GamePhase::Playing => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::MemoryScoreStore;
    use crate::platform::{MemoryDisplay, RecordingRenderer};
    use rand::SeedableRng;

    fn hooks() -> Hooks {
        Hooks {
            store: Box::new(MemoryScoreStore::new()),
            display: Box::new(MemoryDisplay::new()),
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Breakout".parse::<GameKind>().unwrap(), GameKind::Breakout);
        assert_eq!("pac-man".parse::<GameKind>().unwrap(), GameKind::PacMan);
        assert_eq!("space invaders".parse::<GameKind>().unwrap(), GameKind::SpaceInvaders);
        assert!(matches!(
            "asteroids".parse::<GameKind>(),
            Err(ArcadeError::UnknownGame(_))
        ));
    }

    #[test]
    fn test_name_round_trips() {
        for kind in GameKind::ALL {
            assert_eq!(kind.name().parse::<GameKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_every_game_builds_into_menu() {
        let settings = Settings::default();
        for kind in GameKind::ALL {
            let game = kind.build(hooks(), &settings, Pcg32::seed_from_u64(1));
            assert_eq!(game.kind(), kind);
            assert_eq!(game.phase(), GamePhase::Menu);
        }
    }

    #[test]
    fn test_update_outside_playing_is_noop() {
        let settings = Settings::default();
        let input = InputState::new();
        for kind in GameKind::ALL {
            let mut game = kind.build(hooks(), &settings, Pcg32::seed_from_u64(2));
            let before = game.score();
            game.update(16.0, &input).unwrap();
            assert_eq!(game.phase(), GamePhase::Menu);
            assert_eq!(game.score(), before);
        }
    }

    #[test]
    fn test_pause_toggle_from_menu_is_ignored() {
        let settings = Settings::default();
        for kind in GameKind::ALL {
            let mut game = kind.build(hooks(), &settings, Pcg32::seed_from_u64(3));
            assert!(!game.toggle_pause());
            game.start();
            assert!(game.toggle_pause());
            assert_eq!(game.phase(), GamePhase::Paused);
        }
    }

    #[test]
    fn test_paused_overlay_renders() {
        let settings = Settings::default();
        for kind in GameKind::ALL {
            let mut game = kind.build(hooks(), &settings, Pcg32::seed_from_u64(4));
            game.start();
            game.toggle_pause();
            let recorder = RecordingRenderer::new();
            let mut out = recorder.clone();
            game.render(&mut out);
            assert!(recorder.texts().iter().any(|t| t == "PAUSED"), "{}", kind);
        }
    }
}
