//! Pac-Man: grid movers in a small maze

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{Game, GameKind, Hooks, draw_phase_overlay};
use crate::error::Result;
use crate::input::{InputState, Key};
use crate::platform::{Color, Renderer};
use crate::settings::Settings;
use crate::sim::{
    Cell, Direction, GamePhase, Grid, GridMover, PhaseMachine, Rect, ScoreState, Scoreboard,
    StepMode, cell_at,
};

pub const CELL_SIZE: f32 = 20.0;
/// Cells per reference step
pub const PACMAN_SPEED: f32 = 0.125;
pub const GHOST_BASE_SPEED: f32 = 0.0625;
/// Ghost speed-up per level
pub const GHOST_LEVEL_FACTOR: f32 = 1.1;

pub const DOT_POINTS: u64 = 10;
pub const PELLET_POINTS: u64 = 50;
pub const GHOST_POINTS: u64 = 200;
pub const FRIGHTENED_MS: f32 = 10_000.0;

const WALL_COLOR: Color = Color::hex(0x0000ff);
const FRIGHTENED_COLOR: Color = Color::hex(0x2121de);
const GHOST_COLORS: [Color; 4] = [
    Color::hex(0xff0000),
    Color::hex(0x00ffff),
    Color::hex(0xff00ff),
    Color::hex(0xffa500),
];

/// `#` wall, `.` dot, `o` power pellet, space for an empty path
const CLASSIC_MAZE: [&str; 11] = [
    "####################",
    "#.................o#",
    "#.##.###.###.###.#.#",
    "#.#..............#.#",
    "#.#.##.#####.##.##.#",
    "#..................#",
    "#.#.#.#######.#.#..#",
    "#.#.#.........#.#..#",
    "#.#.####.######.#..#",
    "#o................o#",
    "####################",
];
const CLASSIC_START: Cell = Cell::new(1, 1);
const CLASSIC_HOMES: [Cell; 4] = [
    Cell::new(8, 5),
    Cell::new(11, 5),
    Cell::new(8, 7),
    Cell::new(11, 7),
];

const CONTROLS: [(Key, Direction); 4] = [
    (Key::ArrowUp, Direction::Up),
    (Key::ArrowDown, Direction::Down),
    (Key::ArrowLeft, Direction::Left),
    (Key::ArrowRight, Direction::Right),
];

pub fn ghost_speed(level: u32) -> f32 {
    (GHOST_BASE_SPEED * GHOST_LEVEL_FACTOR.powi(level.max(1) as i32 - 1)).min(PACMAN_SPEED)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Path,
    Dot,
    Pellet,
}

impl Tile {
    fn from_char(c: char) -> Self {
        match c {
            '#' => Tile::Wall,
            '.' => Tile::Dot,
            'o' => Tile::Pellet,
            _ => Tile::Path,
        }
    }

    fn is_collectible(self) -> bool {
        matches!(self, Tile::Dot | Tile::Pellet)
    }
}

/// A maze template plus where everyone starts
#[derive(Debug, Clone)]
pub struct MazeLayout {
    pub tiles: Grid<Tile>,
    pub start: Cell,
    pub homes: Vec<Cell>,
}

impl MazeLayout {
    /// Rows of `#`, `.`, `o` and spaces; short rows are padded with wall
    pub fn parse(rows: &[&str], start: Cell, homes: &[Cell]) -> Self {
        let cols = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut tiles = Grid::new(cols, rows.len(), Tile::Wall);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                tiles.set(Cell::new(x as i32, y as i32), Tile::from_char(c));
            }
        }
        Self {
            tiles,
            start,
            homes: homes.to_vec(),
        }
    }

    pub fn classic() -> Self {
        Self::parse(&CLASSIC_MAZE, CLASSIC_START, &CLASSIC_HOMES)
    }

    fn size(&self) -> Vec2 {
        Vec2::new(self.tiles.cols() as f32, self.tiles.rows() as f32) * CELL_SIZE
    }
}

#[derive(Debug, Clone)]
pub struct Ghost {
    pub mover: GridMover,
    pub home: Cell,
    pub color: Color,
    /// Remaining frightened time
    pub frightened_ms: f32,
}

impl Ghost {
    pub fn is_frightened(&self) -> bool {
        self.frightened_ms > 0.0
    }
}

#[derive(Debug)]
pub struct PacMan {
    phase: PhaseMachine,
    board: Scoreboard,
    rng: Pcg32,
    starting_lives: u32,
    step_hz: u32,
    layout: MazeLayout,
    maze: Grid<Tile>,
    pacman: GridMover,
    /// Direction queued by the player, taken at the next centre
    wanted: Direction,
    ghosts: Vec<Ghost>,
}

impl PacMan {
    pub fn new(hooks: Hooks, settings: &Settings, rng: Pcg32) -> Self {
        Self::with_maze(hooks, settings, rng, MazeLayout::classic())
    }

    pub fn with_maze(hooks: Hooks, settings: &Settings, rng: Pcg32, layout: MazeLayout) -> Self {
        let key = GameKind::PacMan.storage_key().unwrap_or("pacmanHighScore");
        let ghosts = layout
            .homes
            .iter()
            .zip(GHOST_COLORS.iter().cycle())
            .map(|(home, color)| Ghost {
                mover: GridMover::new(*home, Direction::Left, ghost_speed(1)),
                home: *home,
                color: *color,
                frightened_ms: 0.0,
            })
            .collect();
        Self {
            phase: PhaseMachine::new(),
            board: Scoreboard::new(key, hooks.store, hooks.display, settings.starting_lives),
            rng,
            starting_lives: settings.starting_lives,
            step_hz: settings.fixed_step_hz,
            maze: layout.tiles.clone(),
            pacman: GridMover::new(layout.start, Direction::Right, PACMAN_SPEED),
            wanted: Direction::Right,
            ghosts,
            layout,
        }
    }

    pub fn pacman(&self) -> &GridMover {
        &self.pacman
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        self.maze.get(cell).copied()
    }

    pub fn remaining(&self) -> usize {
        self.maze.iter().filter(|(_, t)| t.is_collectible()).count()
    }

    fn can_move(&self, from: Cell, dir: Direction) -> bool {
        self.maze
            .get(from.step(dir))
            .is_some_and(|t| *t != Tile::Wall)
    }

    fn reset_positions(&mut self) {
        self.pacman.place(self.layout.start, Direction::Right);
        self.wanted = Direction::Right;
        for ghost in &mut self.ghosts {
            ghost.mover.place(ghost.home, Direction::Left);
            ghost.frightened_ms = 0.0;
        }
    }

    fn set_ghost_speed(&mut self) {
        let speed = ghost_speed(self.board.level());
        for ghost in &mut self.ghosts {
            ghost.mover.speed = speed;
        }
    }

    fn steer(&mut self, input: &InputState) {
        for (key, dir) in CONTROLS {
            if input.is_key_down(key) {
                self.wanted = dir;
            }
        }
    }

    fn move_pacman(&mut self, scale: f32) {
        // at a centre, only turn back into an open tile
        if self.wanted == self.pacman.dir.opposite()
            && (!self.pacman.at_center() || self.can_move(self.pacman.cell, self.wanted))
        {
            self.pacman.reverse();
        }
        if self.pacman.at_center() {
            if self.can_move(self.pacman.cell, self.wanted) {
                self.pacman.dir = self.wanted;
            }
            if !self.can_move(self.pacman.cell, self.pacman.dir) {
                return;
            }
        }
        self.pacman.advance(scale);
    }

    fn collect(&mut self) {
        let cell = cell_at(self.pacman.position());
        match self.tile(cell) {
            Some(Tile::Dot) => {
                self.maze.set(cell, Tile::Path);
                self.board.award(DOT_POINTS);
            }
            Some(Tile::Pellet) => {
                self.maze.set(cell, Tile::Path);
                self.board.award(PELLET_POINTS);
                log::debug!("pacman: power pellet at {:?}", cell);
                for ghost in &mut self.ghosts {
                    ghost.frightened_ms = FRIGHTENED_MS;
                }
            }
            _ => {}
        }
    }

    /// Chase along the dominant axis, then the other axis, then any
    /// non-reversing move, then any move at all. Frightened ghosts flee.
    fn choose_direction(&mut self, index: usize) -> Option<Direction> {
        let ghost = &self.ghosts[index];
        let from = ghost.mover.cell;
        let towards = self.pacman.position() - from.as_vec2();
        let d = if ghost.is_frightened() { -towards } else { towards };
        let horizontal = if d.x > 0.0 { Direction::Right } else { Direction::Left };
        let vertical = if d.y > 0.0 { Direction::Down } else { Direction::Up };
        let preferred = if d.x.abs() > d.y.abs() {
            [horizontal, vertical]
        } else {
            [vertical, horizontal]
        };
        if let Some(dir) = preferred.into_iter().find(|dir| self.can_move(from, *dir)) {
            return Some(dir);
        }

        let back = ghost.mover.dir.opposite();
        let legal: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|dir| self.can_move(from, *dir))
            .collect();
        let forward: Vec<Direction> = legal.iter().copied().filter(|dir| *dir != back).collect();
        let options = if forward.is_empty() { legal } else { forward };
        if options.is_empty() {
            None
        } else {
            Some(options[self.rng.random_range(0..options.len())])
        }
    }

    fn move_ghosts(&mut self, dt_ms: f32, scale: f32) {
        for i in 0..self.ghosts.len() {
            let ghost = &mut self.ghosts[i];
            ghost.frightened_ms = (ghost.frightened_ms - dt_ms).max(0.0);
            if self.ghosts[i].mover.at_center() {
                let Some(dir) = self.choose_direction(i) else {
                    continue;
                };
                self.ghosts[i].mover.dir = dir;
            }
            self.ghosts[i].mover.advance(scale);
        }
    }

    fn check_ghosts(&mut self) {
        let pac = cell_at(self.pacman.position());
        for i in 0..self.ghosts.len() {
            if cell_at(self.ghosts[i].mover.position()) != pac {
                continue;
            }
            if self.ghosts[i].is_frightened() {
                let ghost = &mut self.ghosts[i];
                ghost.mover.place(ghost.home, Direction::Left);
                ghost.frightened_ms = 0.0;
                self.board.award(GHOST_POINTS);
            } else {
                let lives = self.board.lose_life();
                log::info!("pacman: caught, {} lives left", lives);
                if lives == 0 {
                    self.phase.game_over();
                } else {
                    self.reset_positions();
                }
                return;
            }
        }
    }

    fn next_level(&mut self) {
        let level = self.board.next_level();
        log::info!("pacman: level {}", level);
        self.maze = self.layout.tiles.clone();
        self.set_ghost_speed();
        self.reset_positions();
    }

    fn cell_center(pos: Vec2) -> Vec2 {
        pos * CELL_SIZE + Vec2::splat(CELL_SIZE / 2.0)
    }
}

impl Game for PacMan {
    fn kind(&self) -> GameKind {
        GameKind::PacMan
    }

    fn step_mode(&self) -> StepMode {
        StepMode::fixed_hz(self.step_hz)
    }

    fn phase(&self) -> GamePhase {
        self.phase.phase()
    }

    fn update(&mut self, dt_ms: f32, input: &InputState) -> Result<()> {
        if !self.phase.is_playing() {
            return Ok(());
        }
        let scale = crate::step_scale(dt_ms);

        self.steer(input);
        self.move_pacman(scale);
        self.collect();
        self.move_ghosts(dt_ms, scale);
        self.check_ghosts();

        if self.phase.is_playing() && self.remaining() == 0 {
            self.next_level();
        }
        Ok(())
    }

    fn render(&self, out: &mut dyn Renderer) {
        out.clear();
        let size = self.layout.size();
        out.draw_rect(Rect::new(0.0, 0.0, size.x, size.y), Color::BLACK);
        for (cell, tile) in self.maze.iter() {
            let center = Self::cell_center(cell.as_vec2());
            match tile {
                Tile::Wall => out.draw_rect(
                    Rect::new(cell.col as f32 * CELL_SIZE, cell.row as f32 * CELL_SIZE, CELL_SIZE, CELL_SIZE),
                    WALL_COLOR,
                ),
                Tile::Dot => out.draw_circle(center, 2.0, Color::WHITE),
                Tile::Pellet => out.draw_circle(center, 5.0, Color::WHITE),
                Tile::Path => {}
            }
        }
        out.draw_circle(Self::cell_center(self.pacman.position()), CELL_SIZE / 2.0, Color::YELLOW);
        for ghost in &self.ghosts {
            let color = if ghost.is_frightened() { FRIGHTENED_COLOR } else { ghost.color };
            out.draw_circle(Self::cell_center(ghost.mover.position()), CELL_SIZE / 2.0, color);
        }
        draw_phase_overlay(out, self.phase.phase(), "PAC-MAN", size);
    }

    fn start(&mut self) {
        self.board.reset(self.starting_lives);
        self.maze = self.layout.tiles.clone();
        self.set_ghost_speed();
        self.reset_positions();
        self.phase.start();
    }

    fn toggle_pause(&mut self) -> bool {
        self.phase.toggle_pause()
    }

    fn score(&self) -> Option<ScoreState> {
        Some(self.board.state())
    }
}
