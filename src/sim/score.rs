//! Score, lives and level bookkeeping with write-through high score

use serde::{Deserialize, Serialize};

use crate::highscores::ScoreStore;
use crate::platform::{Display, HudField};

/// Scalar run state shown on the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    /// Never decreases within a session; the only durable field
    pub high_score: u64,
    pub lives: u32,
    pub level: u32,
}

/// Owns a game's `ScoreState` and keeps the store and HUD in sync with it
pub struct Scoreboard {
    state: ScoreState,
    key: &'static str,
    store: Box<dyn ScoreStore>,
    display: Box<dyn Display>,
}

impl std::fmt::Debug for Scoreboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scoreboard")
            .field("state", &self.state)
            .field("key", &self.key)
            .finish()
    }
}

impl Scoreboard {
    /// Load the persisted high score for `key` and publish the initial HUD
    pub fn new(
        key: &'static str,
        store: Box<dyn ScoreStore>,
        display: Box<dyn Display>,
        lives: u32,
    ) -> Self {
        let high_score = store.get(key).unwrap_or(0);
        log::info!("{}: loaded high score {}", key, high_score);
        let mut board = Self {
            state: ScoreState {
                score: 0,
                high_score,
                lives,
                level: 1,
            },
            key,
            store,
            display,
        };
        board.publish();
        board
    }

    #[inline]
    pub fn state(&self) -> ScoreState {
        self.state
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.state.score
    }

    #[inline]
    pub fn high_score(&self) -> u64 {
        self.state.high_score
    }

    #[inline]
    pub fn lives(&self) -> u32 {
        self.state.lives
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.state.level
    }

    /// Fresh run: score 0, level 1. High score is kept.
    pub fn reset(&mut self, lives: u32) {
        self.state.score = 0;
        self.state.lives = lives;
        self.state.level = 1;
        self.publish();
    }

    /// Add points; a new best is written to the store immediately.
    /// A failed write is logged and play goes on with the in-memory best.
    pub fn award(&mut self, points: u64) {
        self.state.score = self.state.score.saturating_add(points);
        self.display.set_field(HudField::Score, self.state.score);
        if self.state.score > self.state.high_score {
            self.state.high_score = self.state.score;
            self.display.set_field(HudField::HighScore, self.state.high_score);
            if let Err(e) = self.store.set(self.key, self.state.high_score) {
                log::warn!("{}: high score not saved: {}", self.key, e);
            }
        }
    }

    /// Take one life; returns lives remaining
    pub fn lose_life(&mut self) -> u32 {
        self.state.lives = self.state.lives.saturating_sub(1);
        self.display.set_field(HudField::Lives, self.state.lives as u64);
        self.state.lives
    }

    pub fn set_lives(&mut self, lives: u32) {
        self.state.lives = lives;
        self.display.set_field(HudField::Lives, lives as u64);
    }

    /// Advance one level; returns the new level
    pub fn next_level(&mut self) -> u32 {
        self.set_level(self.state.level + 1);
        log::info!("{}: level {}", self.key, self.state.level);
        self.state.level
    }

    pub fn set_level(&mut self, level: u32) {
        self.state.level = level;
        self.display.set_field(HudField::Level, level as u64);
    }

    /// Write an auxiliary HUD field (lines cleared, ...)
    pub fn show(&mut self, field: HudField, value: u64) {
        self.display.set_field(field, value);
    }

    fn publish(&mut self) {
        self.display.set_field(HudField::Score, self.state.score);
        self.display.set_field(HudField::HighScore, self.state.high_score);
        self.display.set_field(HudField::Lives, self.state.lives as u64);
        self.display.set_field(HudField::Level, self.state.level as u64);
    }
}
