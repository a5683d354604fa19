//! Loop and gameplay settings
//!
//! Persisted in LocalStorage on the web; read from the JSON file named by
//! `ARCADE_SETTINGS` natively.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_STEP_HZ, MAX_CATCH_UP_STEPS, MAX_FRAME_DELTA_MS, STARTING_LIVES};
use crate::error::{ArcadeError, Result};

/// Tunables shared by every game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Loop ===
    /// Simulation rate for fixed-step games
    pub fixed_step_hz: u32,
    /// Fixed steps run per host frame before the backlog is dropped
    pub max_catch_up_steps: u32,
    /// Largest delta fed to variable and gated games
    pub max_frame_delta_ms: f64,

    // === Gameplay ===
    pub starting_lives: u32,
    /// Points that end a Pong match
    pub pong_winning_score: u32,

    /// RNG seed; the host clock is used when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fixed_step_hz: DEFAULT_STEP_HZ,
            max_catch_up_steps: MAX_CATCH_UP_STEPS,
            max_frame_delta_ms: MAX_FRAME_DELTA_MS,
            starting_lives: STARTING_LIVES,
            pong_winning_score: 11,
            seed: None,
        }
    }
}

impl Settings {
    /// Parse and validate; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=1000).contains(&self.fixed_step_hz) {
            return Err(ArcadeError::InvalidSettings(format!(
                "fixed_step_hz must be in 1..=1000, got {}",
                self.fixed_step_hz
            )));
        }
        if self.max_catch_up_steps == 0 {
            return Err(ArcadeError::InvalidSettings(
                "max_catch_up_steps must be at least 1".into(),
            ));
        }
        if !(self.max_frame_delta_ms > 0.0) {
            return Err(ArcadeError::InvalidSettings(format!(
                "max_frame_delta_ms must be positive, got {}",
                self.max_frame_delta_ms
            )));
        }
        if self.starting_lives == 0 {
            return Err(ArcadeError::InvalidSettings("starting_lives must be at least 1".into()));
        }
        if self.pong_winning_score == 0 {
            return Err(ArcadeError::InvalidSettings(
                "pong_winning_score must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "arcade_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<()> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(ArcadeError::MissingCapability("localStorage"))?;
        storage
            .set_item(Self::STORAGE_KEY, &self.to_json()?)
            .map_err(|e| ArcadeError::Storage(format!("{:?}", e)))?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Environment variable naming a JSON settings file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub const ENV_VAR: &'static str = "ARCADE_SETTINGS";

    /// Load from the file named by `ARCADE_SETTINGS`, else defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::ENV_VAR) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::load_file(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path, e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ArcadeError::Storage(e.to_string()))?;
        Self::from_json(&json)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<()> {
        let path = std::env::var(Self::ENV_VAR)
            .map_err(|_| ArcadeError::MissingCapability("ARCADE_SETTINGS path"))?;
        std::fs::write(&path, self.to_json()?).map_err(|e| ArcadeError::Storage(e.to_string()))?;
        log::info!("Settings saved to {}", path);
        Ok(())
    }
}
