//! Menu / playing / paused / game-over state machine
//!
//! Requests that make no sense in the current phase (pausing from the menu,
//! resuming while playing) are ignored and reported as `false`.

use serde::{Deserialize, Serialize};

/// Current phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for a start request
    #[default]
    Menu,
    /// Active gameplay; the only phase in which the world updates
    Playing,
    /// Frozen by the player, reversible
    Paused,
    /// Run ended; only a restart leaves this phase
    GameOver,
}

impl GamePhase {
    #[inline]
    pub fn is_playing(self) -> bool {
        self == GamePhase::Playing
    }

    pub fn label(self) -> &'static str {
        match self {
            GamePhase::Menu => "menu",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "game over",
        }
    }
}

/// Owns one game's phase and enforces the legal transitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseMachine {
    phase: GamePhase,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase.is_playing()
    }

    /// Enter `Playing` from any phase. The caller must reset its world first;
    /// a start from `GameOver` or mid-run is always a fresh run.
    pub fn start(&mut self) {
        log::info!("phase {} -> playing", self.phase.label());
        self.phase = GamePhase::Playing;
    }

    /// `Playing -> Paused`; repeated calls leave it paused
    pub fn pause(&mut self) -> bool {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            true
        } else {
            false
        }
    }

    /// `Paused -> Playing`
    pub fn resume(&mut self) -> bool {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            true
        } else {
            false
        }
    }

    /// Flip between `Playing` and `Paused`; no-op elsewhere
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Loss condition reached. Only legal while playing.
    pub fn game_over(&mut self) -> bool {
        if self.phase == GamePhase::Playing {
            log::info!("phase playing -> game over");
            self.phase = GamePhase::GameOver;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_to_playing() {
        let mut m = PhaseMachine::new();
        assert_eq!(m.phase(), GamePhase::Menu);
        m.start();
        assert!(m.is_playing());
    }

    #[test]
    fn test_pause_from_menu_is_noop() {
        let mut m = PhaseMachine::new();
        assert!(!m.pause());
        assert!(!m.toggle_pause());
        assert_eq!(m.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut m = PhaseMachine::new();
        m.start();
        assert!(m.pause());
        let once = m.phase();
        assert!(!m.pause());
        assert_eq!(m.phase(), once);
        assert_eq!(m.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut m = PhaseMachine::new();
        m.start();
        assert!(m.toggle_pause());
        assert_eq!(m.phase(), GamePhase::Paused);
        assert!(m.toggle_pause());
        assert_eq!(m.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_game_over_is_terminal_until_restart() {
        let mut m = PhaseMachine::new();
        m.start();
        assert!(m.game_over());
        assert!(!m.toggle_pause());
        assert!(!m.game_over());
        assert_eq!(m.phase(), GamePhase::GameOver);
        m.start();
        assert!(m.is_playing());
    }

    #[test]
    fn test_game_over_not_reachable_while_paused() {
        let mut m = PhaseMachine::new();
        m.start();
        m.pause();
        assert!(!m.game_over());
        assert_eq!(m.phase(), GamePhase::Paused);
    }
}
