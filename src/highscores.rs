//! High score persistence boundary
//!
//! Each game keeps exactly one durable scalar, keyed by a per-game string.
//! Values are integers; older saves that stored text (`"120"`, `"120.0"`)
//! are normalised when read.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;

/// Durable integer key-value store
pub trait ScoreStore {
    /// Stored value, or `None` when absent or unreadable
    fn get(&self, key: &str) -> Option<u64>;
    fn set(&mut self, key: &str, value: u64) -> Result<()>;
}

/// Parse a stored high score, accepting integer or float text.
/// Negative, non-finite or non-numeric text reads as absent.
pub fn parse_stored_score(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<u64>() {
        return Some(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v.floor() as u64),
        _ => {
            log::warn!("Ignoring unreadable stored score {:?}", raw);
            None
        }
    }
}

/// In-memory store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    values: Rc<RefCell<HashMap<String, u64>>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one value
    pub fn with(key: &str, value: u64) -> Self {
        let store = Self::new();
        store.values.borrow_mut().insert(key.to_string(), value);
        store
    }
}

impl ScoreStore for MemoryScoreStore {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.borrow().get(key).copied()
    }

    fn set(&mut self, key: &str, value: u64) -> Result<()> {
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// Store whose writes always fail, like a full localStorage
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FailingScoreStore;

#[cfg(test)]
impl ScoreStore for FailingScoreStore {
    fn get(&self, _key: &str) -> Option<u64> {
        None
    }

    fn set(&mut self, _key: &str, _value: u64) -> Result<()> {
        Err(crate::error::ArcadeError::Storage("quota exceeded".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_and_float_text() {
        assert_eq!(parse_stored_score("120"), Some(120));
        assert_eq!(parse_stored_score(" 120.0 "), Some(120));
        assert_eq!(parse_stored_score("99.9"), Some(99));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_stored_score("abc"), None);
        assert_eq!(parse_stored_score("-5"), None);
        assert_eq!(parse_stored_score("NaN"), None);
        assert_eq!(parse_stored_score(""), None);
    }

    #[test]
    fn test_memory_store_shared_between_clones() {
        let store = MemoryScoreStore::new();
        let mut writer = store.clone();
        writer.set("snakeHighScore", 40).unwrap();
        assert_eq!(store.get("snakeHighScore"), Some(40));
        assert_eq!(store.get("tetrisHighScore"), None);
    }
}
