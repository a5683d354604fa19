//! Platform abstraction layer
//!
//! The core never draws pixels or touches the DOM itself. It talks to:
//! - `Renderer`: 2-D draw calls (canvas on web, recorded natively)
//! - `Display`: named HUD fields (score, lives, ...)
//!
//! Storage lives in `crate::highscores`, input in `crate::input`.

pub mod recording;
#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use recording::{DrawCommand, MemoryDisplay, RecordingRenderer};

use crate::sim::Rect;

/// RGB color with alpha in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color::hex(0x000000);
    pub const WHITE: Color = Color::hex(0xffffff);
    pub const RED: Color = Color::hex(0xff0000);
    pub const GREEN: Color = Color::hex(0x00ff00);
    pub const BLUE: Color = Color::hex(0x0000ff);
    pub const YELLOW: Color = Color::hex(0xffff00);
    pub const CYAN: Color = Color::hex(0x00ffff);
    pub const GRID: Color = Color::hex(0x333333);

    /// Opaque color from `0xRRGGBB`
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 1.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS color string for canvas fill styles
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Font settings for `Renderer::draw_text`; text is centred on its anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub size: f32,
    pub font: &'static str,
}

impl TextStyle {
    pub fn new(color: Color, size: f32) -> Self {
        Self {
            color,
            size,
            font: crate::consts::OVERLAY_FONT,
        }
    }
}

/// Draw-call surface consumed by `render()`
pub trait Renderer {
    fn clear(&mut self);
    fn draw_rect(&mut self, rect: Rect, color: Color);
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn draw_text(&mut self, text: &str, pos: Vec2, style: TextStyle);
}

/// Named HUD fields the core keeps current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HudField {
    Score,
    HighScore,
    Lives,
    Level,
    Lines,
    PlayerScore,
    ComputerScore,
}

impl HudField {
    /// DOM element id on the web page
    pub fn element_id(self) -> &'static str {
        match self {
            HudField::Score => "score",
            HudField::HighScore => "highScore",
            HudField::Lives => "lives",
            HudField::Level => "level",
            HudField::Lines => "lines",
            HudField::PlayerScore => "playerScore",
            HudField::ComputerScore => "computerScore",
        }
    }
}

/// HUD text sink
pub trait Display {
    fn set_field(&mut self, field: HudField, value: u64);
}

/// Draw a centred overlay line
pub(crate) fn overlay_text(out: &mut dyn Renderer, text: &str, center: Vec2, color: Color, size: f32) {
    out.draw_text(text, center, TextStyle::new(color, size));
}
