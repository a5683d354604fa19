//! Polled input snapshot
//!
//! The host pushes key and pointer notifications in between ticks; games read
//! the latest state during `update()`. Nothing is queued: only the current
//! state and the edges since the last simulation step are kept.

use std::collections::HashSet;
use std::fmt;

use glam::Vec2;

/// Keys the games care about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Enter,
    Escape,
    /// Printable key, lowercased
    Char(char),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom_key(key: &str) -> Option<Key> {
        match key {
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            " " | "Spacebar" => Some(Key::Space),
            "Enter" => Some(Key::Enter),
            "Escape" | "Esc" => Some(Key::Escape),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c.to_lowercase().next().map(Key::Char),
                    _ => None,
                }
            }
        }
    }
}

/// Pointer position in canvas pixels plus button state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub position: Vec2,
    pub pressed: bool,
}

/// Keyboard and pointer state for one game session
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Keys currently held down
    keys_down: HashSet<Key>,
    /// Keys pressed since the last simulation step
    keys_just_pressed: HashSet<Key>,
    pointer: Pointer,
    /// Pointer moved since the last simulation step
    pointer_moved: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        // auto-repeat keydowns are not new presses
        if self.keys_down.insert(key) {
            self.keys_just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.keys_down.remove(&key);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.position = Vec2::new(x, y);
        self.pointer_moved = true;
    }

    pub fn pointer_down(&mut self) {
        self.pointer.pressed = true;
    }

    pub fn pointer_up(&mut self) {
        self.pointer.pressed = false;
    }

    /// Clear edge state once a simulation step has seen it
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
        self.pointer_moved = false;
    }

    /// Drop everything, e.g. when the tab loses focus and key-ups go missing
    pub fn release_all(&mut self) {
        self.keys_down.clear();
        self.keys_just_pressed.clear();
        self.pointer.pressed = false;
        self.pointer_moved = false;
    }

    // --- Query methods ---

    #[inline]
    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    #[inline]
    pub fn is_key_just_pressed(&self, key: Key) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    /// Any of `keys` held
    pub fn any_down(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.is_key_down(*k))
    }

    /// Any of `keys` pressed this step
    pub fn any_just_pressed(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.is_key_just_pressed(*k))
    }

    #[inline]
    pub fn pointer_position(&self) -> Vec2 {
        self.pointer.position
    }

    #[inline]
    pub fn is_pointer_down(&self) -> bool {
        self.pointer.pressed
    }

    #[inline]
    pub fn pointer_moved(&self) -> bool {
        self.pointer_moved
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }
}

/// Detaches host event listeners when disposed or dropped
#[derive(Default)]
pub struct ListenerHandle {
    detach: Option<Box<dyn FnOnce()>>,
}

impl ListenerHandle {
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.detach.is_some()
    }

    /// Remove the listeners. Later calls do nothing.
    pub fn dispose(&mut self) {
        if let Some(detach) = self.detach.take() {
            log::debug!("detaching input listeners");
            detach();
        }
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
