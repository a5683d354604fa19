//! Fixed-size 2-D grids and grid-bound movers
//!
//! Bricks, tetris boards and mazes all live in a `Grid<T>` addressed by
//! integer `(col, row)`. Out-of-range reads return `None` so callers can treat
//! the outside of the board however their rules need (wall, floor, void).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::platform::Color;

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Neighbour one step in `dir`
    pub fn step(self, dir: Direction) -> Self {
        let (dc, dr) = dir.offset();
        Self::new(self.col + dc, self.row + dr)
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.col as f32, self.row as f32)
    }
}

/// Cardinal movement direction on a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// (col, row) offset; rows grow downward
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn as_vec2(self) -> Vec2 {
        let (dc, dr) = self.offset();
        Vec2::new(dc as f32, dr as f32)
    }
}

/// Occupancy of a layout cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellStatus {
    #[default]
    Empty,
    Filled,
    Special,
}

/// A static layout element (brick, locked tetromino block)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridCell {
    pub status: CellStatus,
    pub color: Color,
}

impl GridCell {
    pub const EMPTY: GridCell = GridCell {
        status: CellStatus::Empty,
        color: Color::BLACK,
    };

    pub fn filled(color: Color) -> Self {
        Self {
            status: CellStatus::Filled,
            color,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.status == CellStatus::Empty
    }
}

/// Row-major fixed-size grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    cols: usize,
    rows: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Grid filled with `fill`
    pub fn new(cols: usize, rows: usize, fill: T) -> Self {
        Self {
            cols,
            rows,
            cells: vec![fill; cols * rows],
        }
    }

    /// Build from row slices; every row must have the same length
    pub fn from_rows(rows: &[&[T]]) -> Self {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        debug_assert!(rows.iter().all(|r| r.len() == cols), "ragged grid template");
        let cells = rows.iter().flat_map(|r| r.iter().cloned()).collect();
        Self {
            cols,
            rows: rows.len(),
            cells,
        }
    }

    /// Remove row `row`, shift everything above it down by one and insert
    /// `fill` as the new top row
    pub fn collapse_row(&mut self, row: usize, fill: T) {
        if row >= self.rows {
            return;
        }
        let start = row * self.cols;
        self.cells.drain(start..start + self.cols);
        let blank = std::iter::repeat_n(fill, self.cols);
        self.cells.splice(0..0, blank);
    }
}

impl<T> Grid<T> {
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.col >= 0 && cell.row >= 0 && (cell.col as usize) < self.cols && (cell.row as usize) < self.rows
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.row as usize * self.cols + cell.col as usize)
    }

    pub fn get(&self, cell: Cell) -> Option<&T> {
        self.index(cell).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
        self.index(cell).map(move |i| &mut self.cells[i])
    }

    /// Overwrite a cell; returns false when `cell` is off the grid
    pub fn set(&mut self, cell: Cell, value: T) -> bool {
        match self.get_mut(cell) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// One row as a slice
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    /// All cells with their coordinates, row by row
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &T)> {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (Cell::new((i % cols) as i32, (i / cols) as i32), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Cell, &mut T)> {
        let cols = self.cols.max(1);
        self.cells
            .iter_mut()
            .enumerate()
            .map(move |(i, v)| (Cell::new((i % cols) as i32, (i / cols) as i32), v))
    }
}

/// An entity that travels from cell centre to cell centre
///
/// `progress` is the fraction of the way toward `cell.step(dir)`. Turns are
/// only taken at a centre (`progress == 0`); reversals can happen anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMover {
    pub cell: Cell,
    pub dir: Direction,
    pub progress: f32,
    /// Cells per reference step
    pub speed: f32,
}

impl GridMover {
    pub fn new(cell: Cell, dir: Direction, speed: f32) -> Self {
        Self {
            cell,
            dir,
            progress: 0.0,
            speed,
        }
    }

    /// Continuous position in cell units
    pub fn position(&self) -> Vec2 {
        self.cell.as_vec2() + self.dir.as_vec2() * self.progress
    }

    #[inline]
    pub fn at_center(&self) -> bool {
        self.progress == 0.0
    }

    /// Turn around mid-corridor without losing distance
    pub fn reverse(&mut self) {
        if self.progress > 0.0 {
            self.cell = self.cell.step(self.dir);
            self.progress = 1.0 - self.progress;
        }
        self.dir = self.dir.opposite();
    }

    /// Advance toward the next centre by `scale` reference steps.
    /// Overshoot past a centre is dropped so the mover snaps onto it.
    /// Returns true when a centre was reached.
    pub fn advance(&mut self, scale: f32) -> bool {
        self.progress += self.speed * scale;
        if self.progress >= 1.0 {
            self.cell = self.cell.step(self.dir);
            self.progress = 0.0;
            true
        } else {
            false
        }
    }

    /// Jump to a cell centre
    pub fn place(&mut self, cell: Cell, dir: Direction) {
        self.cell = cell;
        self.dir = dir;
        self.progress = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_out_of_range_is_none() {
        let grid = Grid::new(3, 2, 0u8);
        assert!(grid.get(Cell::new(-1, 0)).is_none());
        assert!(grid.get(Cell::new(3, 0)).is_none());
        assert!(grid.get(Cell::new(0, 2)).is_none());
        assert_eq!(grid.get(Cell::new(2, 1)), Some(&0));
    }

    #[test]
    fn test_collapse_row_shifts_down() {
        let mut grid = Grid::from_rows(&[&[1, 1], &[2, 2], &[3, 3]]);
        grid.collapse_row(1, 0);
        assert_eq!(grid.row(0), &[0, 0]);
        assert_eq!(grid.row(1), &[1, 1]);
        assert_eq!(grid.row(2), &[3, 3]);
    }

    #[test]
    fn test_iter_reports_coordinates() {
        let grid = Grid::from_rows(&[&['a', 'b'], &['c', 'd']]);
        let cells: Vec<_> = grid.iter().map(|(c, v)| (c, *v)).collect();
        assert_eq!(cells[3], (Cell::new(1, 1), 'd'));
        assert_eq!(cells[1], (Cell::new(1, 0), 'b'));
    }

    #[test]
    fn test_mover_advances_and_snaps() {
        let mut m = GridMover::new(Cell::new(1, 1), Direction::Right, 0.25);
        assert!(!m.advance(1.0));
        assert!(!m.advance(1.0));
        assert!(!m.advance(1.0));
        assert!(m.advance(1.0));
        assert_eq!(m.cell, Cell::new(2, 1));
        assert!(m.at_center());
    }

    #[test]
    fn test_mover_reverse_midway() {
        let mut m = GridMover::new(Cell::new(1, 1), Direction::Right, 0.25);
        m.advance(1.0);
        m.reverse();
        assert_eq!(m.cell, Cell::new(2, 1));
        assert_eq!(m.dir, Direction::Left);
        assert!((m.progress - 0.75).abs() < 1e-6);
        assert!((m.position() - Vec2::new(1.25, 1.0)).length() < 1e-6);
    }
}
