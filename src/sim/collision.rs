//! Collision queries for rectangles and grids
//!
//! Every function here is query-only. Callers decide the response: reflect a
//! velocity axis, take a life, clear a cell or kill an entity.

use glam::Vec2;

use super::grid::Cell;
use super::rect::Rect;

/// Velocity axis to reflect after a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Strict AABB overlap: touching edges do not count
#[inline]
pub fn overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

/// Overlap between a circle's bounding box and a rect
#[inline]
pub fn circle_overlaps_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    overlap(&Rect::around_circle(center, radius), rect)
}

/// Decide which side of `target` a mover at `point` struck
///
/// The offset from the target's centre is compared per axis, with the
/// vertical offset scaled by the target's aspect ratio. When the horizontal
/// offset dominates the ball came in from a side and its horizontal velocity
/// flips; otherwise it hit the top or bottom face.
pub fn bounce_axis(point: Vec2, target: &Rect) -> Axis {
    let center = target.center();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    if target.height > 0.0 && dx.abs() > dy.abs() * target.width / target.height {
        Axis::Horizontal
    } else {
        Axis::Vertical
    }
}

/// Flip one velocity component
#[inline]
pub fn reflect(velocity: Vec2, axis: Axis) -> Vec2 {
    match axis {
        Axis::Horizontal => Vec2::new(-velocity.x, velocity.y),
        Axis::Vertical => Vec2::new(velocity.x, -velocity.y),
    }
}

/// Where along a paddle's width a hit landed, from -1 (left edge) to 1 (right edge)
pub fn hit_offset(hit_x: f32, paddle: &Rect) -> f32 {
    if paddle.width <= 0.0 {
        return 0.0;
    }
    let half = paddle.width / 2.0;
    ((hit_x - (paddle.x + half)) / half).clamp(-1.0, 1.0)
}

/// Grid cell nearest to a continuous position measured in cell units
#[inline]
pub fn cell_at(pos: Vec2) -> Cell {
    Cell::new(pos.x.round() as i32, pos.y.round() as i32)
}
