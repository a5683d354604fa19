//! Axis-aligned rectangle geometry for paddles, bricks, bullets and ships
//!
//! A rect is defined by its top-left corner and its extent:
//! - x, y: top-left corner in canvas pixels (y grows downward)
//! - width, height: extent, never negative

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in canvas space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Negative extents are clamped to zero
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Rect of the given size centred on `center`
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// Bounding box of a circle
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self::centered(center, radius * 2.0, radius * 2.0)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Top-left corner
    #[inline]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Move by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Keep the rect horizontally inside `[min_x, max_x]`
    pub fn clamp_x(&mut self, min_x: f32, max_x: f32) {
        self.x = self.x.clamp(min_x, (max_x - self.width).max(min_x));
    }

    /// Keep the rect vertically inside `[min_y, max_y]`
    pub fn clamp_y(&mut self, min_y: f32, max_y: f32) {
        self.y = self.y.clamp(min_y, (max_y - self.height).max(min_y));
    }

    /// Area of the shared region with `other` (zero when disjoint)
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w > 0.0 && h > 0.0 { w * h } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_extent_clamped() {
        let r = Rect::new(1.0, 2.0, -5.0, 3.0);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 3.0);
    }

    #[test]
    fn test_circle_bounds() {
        let r = Rect::around_circle(Vec2::new(100.0, 50.0), 10.0);
        assert_eq!(r, Rect::new(90.0, 40.0, 20.0, 20.0));
        assert_eq!(r.center(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_clamp_x() {
        let mut r = Rect::new(790.0, 0.0, 100.0, 20.0);
        r.clamp_x(0.0, 800.0);
        assert_eq!(r.x, 700.0);
        r.x = -30.0;
        r.clamp_x(0.0, 800.0);
        assert_eq!(r.x, 0.0);
    }

    #[test]
    fn test_intersection_area() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!((a.intersection_area(&b) - 25.0).abs() < 1e-6);
        let c = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection_area(&c), 0.0);
    }
}
