//! In-memory host surfaces for native runs and tests
//!
//! Both types are cheap handles over shared state: clone one before boxing it
//! into a session and the clone keeps observing what the game writes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;

use super::{Color, Display, HudField, Renderer, TextStyle};
use crate::sim::Rect;

/// One captured draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Rect { rect: Rect, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    Text { text: String, pos: Vec2, style: TextStyle },
}

#[derive(Debug, Default)]
struct Recording {
    commands: Vec<DrawCommand>,
    frames: u64,
}

/// Renderer that keeps the draw calls of the most recent frame
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    inner: Rc<RefCell<Recording>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands issued since the last `clear()`
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.inner.borrow().commands.clone()
    }

    /// Number of `clear()` calls so far
    pub fn frames(&self) -> u64 {
        self.inner.borrow().frames
    }

    /// All text drawn in the current frame
    pub fn texts(&self) -> Vec<String> {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn rect_count(&self) -> usize {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { .. }))
            .count()
    }

    fn push(&mut self, cmd: DrawCommand) {
        self.inner.borrow_mut().commands.push(cmd);
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self) {
        let mut rec = self.inner.borrow_mut();
        rec.commands.clear();
        rec.commands.push(DrawCommand::Clear);
        rec.frames += 1;
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawCommand::Rect { rect, color });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, style: TextStyle) {
        self.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            style,
        });
    }
}

/// Display that remembers the last value written to each field
#[derive(Debug, Clone, Default)]
pub struct MemoryDisplay {
    fields: Rc<RefCell<HashMap<HudField, u64>>>,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: HudField) -> Option<u64> {
        self.fields.borrow().get(&field).copied()
    }
}

impl Display for MemoryDisplay {
    fn set_field(&mut self, field: HudField, value: u64) {
        self.fields.borrow_mut().insert(field, value);
    }
}
