//! Error types for the arcade core

use thiserror::Error;

/// Errors surfaced by the loop, the session builder and the host boundaries
#[derive(Debug, Error)]
pub enum ArcadeError {
    /// The scheduler was ticked before `start()` was ever called
    #[error("scheduler ticked before start()")]
    NotStarted,

    /// A required host collaborator was not supplied or is unavailable
    #[error("missing host capability: {0}")]
    MissingCapability(&'static str),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("unknown game: {0}")]
    UnknownGame(String),

    #[error("settings parse error: {0}")]
    SettingsParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArcadeError>;
