//! Tetris: falling tetrominoes on a 10x20 board

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{Game, GameKind, Hooks, draw_phase_overlay};
use crate::error::Result;
use crate::input::{InputState, Key};
use crate::platform::{Color, HudField, Renderer, TextStyle};
use crate::settings::Settings;
use crate::sim::{Cell, GamePhase, Grid, GridCell, PhaseMachine, Rect, ScoreState, Scoreboard, StepMode};

pub const COLS: usize = 10;
pub const ROWS: usize = 20;
pub const BLOCK_SIZE: f32 = 30.0;
pub const BOARD_WIDTH: f32 = COLS as f32 * BLOCK_SIZE;
pub const BOARD_HEIGHT: f32 = ROWS as f32 * BLOCK_SIZE;

/// Base points per cleared row, multiplied by rows and level
pub const LINE_POINTS: u64 = 100;
pub const LINES_PER_LEVEL: u32 = 10;
/// Delay between auto-repeated moves while a key is held
pub const REPEAT_MS: f32 = 100.0;

const PREVIEW_ORIGIN: Vec2 = Vec2::new(BOARD_WIDTH + 10.0, 40.0);
const PREVIEW_SIZE: f32 = 100.0;
const PREVIEW_BLOCK: f32 = 20.0;

/// Gravity interval for a level: 1000 ms at level 1, 100 ms faster per
/// level, never below 100 ms
pub fn drop_interval_ms(level: u32) -> f32 {
    (1000.0 - (level.max(1) - 1) as f32 * 100.0).max(100.0)
}

/// The seven pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tetromino {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl Tetromino {
    pub const ALL: [Tetromino; 7] = [
        Tetromino::I,
        Tetromino::O,
        Tetromino::T,
        Tetromino::L,
        Tetromino::J,
        Tetromino::S,
        Tetromino::Z,
    ];

    fn rows(self) -> &'static [&'static [u8]] {
        match self {
            Tetromino::I => &[&[1, 1, 1, 1]],
            Tetromino::O => &[&[1, 1], &[1, 1]],
            Tetromino::T => &[&[1, 1, 1], &[0, 1, 0]],
            Tetromino::L => &[&[1, 1, 1], &[1, 0, 0]],
            Tetromino::J => &[&[1, 1, 1], &[0, 0, 1]],
            Tetromino::S => &[&[1, 1, 0], &[0, 1, 1]],
            Tetromino::Z => &[&[0, 1, 1], &[1, 1, 0]],
        }
    }

    pub fn color(self) -> Color {
        match self {
            Tetromino::I => Color::hex(0x00f0f0),
            Tetromino::O => Color::hex(0xf0f000),
            Tetromino::T => Color::hex(0xa000f0),
            Tetromino::L => Color::hex(0xf0a000),
            Tetromino::J => Color::hex(0x0000f0),
            Tetromino::S => Color::hex(0x00f000),
            Tetromino::Z => Color::hex(0xf00000),
        }
    }

    fn random(rng: &mut Pcg32) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// The falling piece: a rotatable bitmap at a board offset
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub kind: Tetromino,
    shape: Vec<Vec<bool>>,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// New piece centred at the top of the board
    pub fn spawn(kind: Tetromino) -> Self {
        let shape: Vec<Vec<bool>> = kind
            .rows()
            .iter()
            .map(|r| r.iter().map(|v| *v != 0).collect())
            .collect();
        let width = shape.first().map(|r| r.len()).unwrap_or(0) as i32;
        Self {
            kind,
            shape,
            x: COLS as i32 / 2 - width / 2,
            y: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.shape.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.shape.len()
    }

    /// Filled board cells covered by the piece
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.shape.iter().enumerate().flat_map(move |(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(dx, _)| Cell::new(self.x + dx as i32, self.y + dy as i32))
        })
    }

    /// Clockwise rotation about the bitmap
    fn rotate_cw(&mut self) {
        let (h, w) = (self.height(), self.width());
        let mut rotated = vec![vec![false; h]; w];
        for (y, row) in self.shape.iter().enumerate() {
            for (x, filled) in row.iter().enumerate() {
                rotated[x][h - 1 - y] = *filled;
            }
        }
        self.shape = rotated;
    }
}

/// Hold-to-repeat state for one movement key
#[derive(Debug, Clone, Copy, Default)]
struct Repeat {
    held_ms: f32,
}

const MOVES: [(Key, i32, i32); 3] = [
    (Key::ArrowLeft, -1, 0),
    (Key::ArrowRight, 1, 0),
    (Key::ArrowDown, 0, 1),
];

#[derive(Debug)]
pub struct Tetris {
    phase: PhaseMachine,
    board: Scoreboard,
    rng: Pcg32,
    starting_lives: u32,
    grid: Grid<GridCell>,
    piece: Piece,
    next: Piece,
    drop_counter: f32,
    lines: u32,
    repeats: [Repeat; 3],
}

impl Tetris {
    pub fn new(hooks: Hooks, settings: &Settings, mut rng: Pcg32) -> Self {
        let key = GameKind::Tetris.storage_key().unwrap_or("tetrisHighScore");
        let piece = Piece::spawn(Tetromino::random(&mut rng));
        let next = Piece::spawn(Tetromino::random(&mut rng));
        let mut board = Scoreboard::new(key, hooks.store, hooks.display, settings.starting_lives);
        board.show(HudField::Lines, 0);
        Self {
            phase: PhaseMachine::new(),
            board,
            rng,
            starting_lives: settings.starting_lives,
            grid: Grid::new(COLS, ROWS, GridCell::EMPTY),
            piece,
            next,
            drop_counter: 0.0,
            lines: 0,
            repeats: [Repeat::default(); 3],
        }
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn next_piece(&self) -> &Piece {
        &self.next
    }

    /// Off the sides or floor, or on a locked block. Rows above the top are open.
    fn collides(&self, piece: &Piece) -> bool {
        piece.cells().any(|c| {
            if c.col < 0 || c.col >= COLS as i32 || c.row >= ROWS as i32 {
                return true;
            }
            c.row >= 0 && self.grid.get(c).is_some_and(|g| !g.is_empty())
        })
    }

    /// Move by (dx, dy) unless blocked
    fn shift(&mut self, dx: i32, dy: i32) -> bool {
        let mut moved = self.piece.clone();
        moved.x += dx;
        moved.y += dy;
        if self.collides(&moved) {
            false
        } else {
            self.piece = moved;
            true
        }
    }

    /// Rotate clockwise, trying kicks left, right and up before giving up.
    /// A kick never lifts the piece past the top row.
    fn rotate(&mut self) {
        let mut rotated = self.piece.clone();
        rotated.rotate_cw();
        for (dx, dy) in [(0, 0), (-1, 0), (1, 0), (0, -1)] {
            let mut candidate = rotated.clone();
            candidate.x += dx;
            candidate.y += dy;
            if candidate.cells().all(|c| c.row >= 0) && !self.collides(&candidate) {
                self.piece = candidate;
                return;
            }
        }
    }

    fn hard_drop(&mut self) {
        while self.shift(0, 1) {}
        self.lock();
    }

    /// Merge the piece into the board, clear rows and spawn the next piece.
    /// Locking with any block above the top row stacks out.
    fn lock(&mut self) {
        let color = self.piece.kind.color();
        let cells: Vec<Cell> = self.piece.cells().collect();
        let overflow = cells.iter().any(|c| c.row < 0);
        for cell in cells {
            self.grid.set(cell, GridCell::filled(color));
        }
        if overflow {
            log::info!("tetris: locked above the top with {} lines", self.lines);
            self.phase.game_over();
            return;
        }
        self.clear_lines();

        let upcoming = Piece::spawn(Tetromino::random(&mut self.rng));
        self.piece = std::mem::replace(&mut self.next, upcoming);
        self.drop_counter = 0.0;
        if self.collides(&self.piece) {
            log::info!("tetris: stacked out with {} lines", self.lines);
            self.phase.game_over();
        }
    }

    /// Remove full rows; everything above drops and empty rows enter at the top
    fn clear_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut row = ROWS;
        while row > 0 {
            if self.grid.row(row - 1).iter().all(|c| !c.is_empty()) {
                self.grid.collapse_row(row - 1, GridCell::EMPTY);
                cleared += 1;
            } else {
                row -= 1;
            }
        }
        if cleared > 0 {
            let level = self.board.level();
            self.board.award(cleared as u64 * LINE_POINTS * level as u64);
            self.lines += cleared;
            self.board.show(HudField::Lines, self.lines as u64);
            let new_level = self.lines / LINES_PER_LEVEL + 1;
            if new_level != level {
                log::info!("tetris: level {}", new_level);
                self.board.set_level(new_level);
            }
        }
        cleared
    }

    fn handle_moves(&mut self, dt_ms: f32, input: &InputState) {
        for (i, (key, dx, dy)) in MOVES.into_iter().enumerate() {
            if input.is_key_just_pressed(key) {
                self.repeats[i].held_ms = 0.0;
                self.shift(dx, dy);
            } else if input.is_key_down(key) {
                self.repeats[i].held_ms += dt_ms;
                while self.repeats[i].held_ms >= REPEAT_MS {
                    self.repeats[i].held_ms -= REPEAT_MS;
                    self.shift(dx, dy);
                }
            } else {
                self.repeats[i].held_ms = 0.0;
            }
        }
    }

    fn draw_block(out: &mut dyn Renderer, origin: Vec2, cell: Cell, size: f32, color: Color) {
        out.draw_rect(
            Rect::new(
                origin.x + cell.col as f32 * size,
                origin.y + cell.row as f32 * size,
                size - 1.0,
                size - 1.0,
            ),
            color,
        );
    }
}

impl Game for Tetris {
    fn kind(&self) -> GameKind {
        GameKind::Tetris
    }

    fn step_mode(&self) -> StepMode {
        StepMode::Variable
    }

    fn phase(&self) -> GamePhase {
        self.phase.phase()
    }

    fn update(&mut self, dt_ms: f32, input: &InputState) -> Result<()> {
        if !self.phase.is_playing() {
            return Ok(());
        }

        if input.is_key_just_pressed(Key::Space) {
            self.hard_drop();
            if !self.phase.is_playing() {
                return Ok(());
            }
        }
        if input.is_key_just_pressed(Key::ArrowUp) {
            self.rotate();
        }
        self.handle_moves(dt_ms, input);

        self.drop_counter += dt_ms;
        if self.drop_counter > drop_interval_ms(self.board.level()) {
            self.drop_counter = 0.0;
            if !self.shift(0, 1) {
                self.lock();
            }
        }
        Ok(())
    }

    fn render(&self, out: &mut dyn Renderer) {
        out.clear();
        out.draw_rect(Rect::new(0.0, 0.0, BOARD_WIDTH, BOARD_HEIGHT), Color::BLACK);
        for (cell, block) in self.grid.iter() {
            if !block.is_empty() {
                Self::draw_block(out, Vec2::ZERO, cell, BLOCK_SIZE, block.color);
            }
        }
        let color = self.piece.kind.color();
        for cell in self.piece.cells() {
            Self::draw_block(out, Vec2::ZERO, cell, BLOCK_SIZE, color);
        }

        // next-piece preview, centred in its box
        out.draw_text(
            "NEXT",
            PREVIEW_ORIGIN + Vec2::new(PREVIEW_SIZE / 2.0, -16.0),
            TextStyle::new(Color::WHITE, 12.0),
        );
        let offset = Vec2::new(
            (PREVIEW_SIZE - self.next.width() as f32 * PREVIEW_BLOCK) / 2.0,
            (PREVIEW_SIZE - self.next.height() as f32 * PREVIEW_BLOCK) / 2.0,
        );
        let mut preview = self.next.clone();
        preview.x = 0;
        preview.y = 0;
        for cell in preview.cells() {
            Self::draw_block(out, PREVIEW_ORIGIN + offset, cell, PREVIEW_BLOCK, self.next.kind.color());
        }

        draw_phase_overlay(out, self.phase.phase(), "TETRIS", Vec2::new(BOARD_WIDTH, BOARD_HEIGHT));
    }

    fn start(&mut self) {
        self.board.reset(self.starting_lives);
        self.grid = Grid::new(COLS, ROWS, GridCell::EMPTY);
        self.lines = 0;
        self.board.show(HudField::Lines, 0);
        self.piece = Piece::spawn(Tetromino::random(&mut self.rng));
        self.next = Piece::spawn(Tetromino::random(&mut self.rng));
        self.drop_counter = 0.0;
        self.repeats = [Repeat::default(); 3];
        self.phase.start();
    }

    fn toggle_pause(&mut self) -> bool {
        self.phase.toggle_pause()
    }

    fn score(&self) -> Option<ScoreState> {
        Some(self.board.state())
    }
}
