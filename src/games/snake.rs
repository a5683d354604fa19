//! Snake on a 20x20 board, advanced on a timer gate

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{Game, GameKind, Hooks, draw_phase_overlay};
use crate::error::Result;
use crate::input::{InputState, Key};
use crate::platform::{Color, Renderer};
use crate::settings::Settings;
use crate::sim::{Cell, Direction, GamePhase, PhaseMachine, Rect, ScoreState, Scoreboard, StepMode};

pub const TILE_COUNT: i32 = 20;
pub const TILE_SIZE: f32 = 20.0;
pub const FIELD_SIZE: f32 = TILE_COUNT as f32 * TILE_SIZE;
pub const START_CELL: Cell = Cell::new(10, 10);
/// Moves per second
pub const SPEED: f64 = 10.0;
pub const FOOD_POINTS: u64 = 10;
/// Segments closer to the head than this cannot be hit by it
const SAFE_SEGMENTS: usize = 4;

const CONTROLS: [([Key; 2], Direction); 4] = [
    ([Key::ArrowUp, Key::Char('w')], Direction::Up),
    ([Key::ArrowDown, Key::Char('s')], Direction::Down),
    ([Key::ArrowLeft, Key::Char('a')], Direction::Left),
    ([Key::ArrowRight, Key::Char('d')], Direction::Right),
];

#[derive(Debug)]
pub struct Snake {
    phase: PhaseMachine,
    board: Scoreboard,
    rng: Pcg32,
    starting_lives: u32,
    /// Head first
    body: VecDeque<Cell>,
    /// `None` until the first direction key
    heading: Option<Direction>,
    /// Direction of the last move actually made
    last_moved: Option<Direction>,
    food: Option<Cell>,
}

impl Snake {
    pub fn new(hooks: Hooks, settings: &Settings, rng: Pcg32) -> Self {
        let key = GameKind::Snake.storage_key().unwrap_or("snakeHighScore");
        let mut game = Self {
            phase: PhaseMachine::new(),
            board: Scoreboard::new(key, hooks.store, hooks.display, settings.starting_lives),
            rng,
            starting_lives: settings.starting_lives,
            body: VecDeque::from([START_CELL]),
            heading: None,
            last_moved: None,
            food: None,
        };
        game.place_food();
        game
    }

    pub fn length(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Cell {
        self.body.front().copied().unwrap_or(START_CELL)
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    fn on_board(cell: Cell) -> bool {
        (0..TILE_COUNT).contains(&cell.col) && (0..TILE_COUNT).contains(&cell.row)
    }

    /// Put food on a random free tile. Returns false when the board is full.
    fn place_food(&mut self) -> bool {
        let free: Vec<Cell> = (0..TILE_COUNT)
            .flat_map(|row| (0..TILE_COUNT).map(move |col| Cell::new(col, row)))
            .filter(|c| !self.body.contains(c))
            .collect();
        if free.is_empty() {
            self.food = None;
            return false;
        }
        let cell = free[self.rng.random_range(0..free.len())];
        log::debug!("snake: food at {:?}", cell);
        self.food = Some(cell);
        true
    }

    fn steer(&mut self, input: &InputState) {
        for (keys, dir) in CONTROLS {
            if input.any_just_pressed(&keys) && self.last_moved != Some(dir.opposite()) {
                self.heading = Some(dir);
            }
        }
    }

    fn advance(&mut self) {
        let Some(dir) = self.heading else {
            return;
        };
        let head = self.head().step(dir);
        self.last_moved = Some(dir);

        if !Self::on_board(head) {
            log::info!("snake: hit the wall at length {}", self.length());
            self.phase.game_over();
            return;
        }

        self.body.push_front(head);
        if self.food == Some(head) {
            self.board.award(FOOD_POINTS);
            if !self.place_food() {
                log::info!("snake: board filled");
                self.phase.game_over();
                return;
            }
        } else {
            self.body.pop_back();
        }

        if self.body.iter().skip(SAFE_SEGMENTS).any(|c| *c == head) {
            log::info!("snake: bit itself at length {}", self.length());
            self.phase.game_over();
        }
    }

    fn tile_rect(cell: Cell) -> Rect {
        Rect::new(
            cell.col as f32 * TILE_SIZE,
            cell.row as f32 * TILE_SIZE,
            TILE_SIZE - 1.0,
            TILE_SIZE - 1.0,
        )
    }
}

impl Game for Snake {
    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    fn step_mode(&self) -> StepMode {
        StepMode::Gated {
            interval_ms: 1000.0 / SPEED,
        }
    }

    fn phase(&self) -> GamePhase {
        self.phase.phase()
    }

    fn update(&mut self, _dt_ms: f32, input: &InputState) -> Result<()> {
        if !self.phase.is_playing() {
            return Ok(());
        }
        self.steer(input);
        self.advance();
        Ok(())
    }

    fn render(&self, out: &mut dyn Renderer) {
        out.clear();
        out.draw_rect(Rect::new(0.0, 0.0, FIELD_SIZE, FIELD_SIZE), Color::BLACK);
        for i in 0..=TILE_COUNT {
            let at = i as f32 * TILE_SIZE;
            out.draw_rect(Rect::new(at, 0.0, 0.5, FIELD_SIZE), Color::GRID);
            out.draw_rect(Rect::new(0.0, at, FIELD_SIZE, 0.5), Color::GRID);
        }
        for segment in &self.body {
            out.draw_rect(Self::tile_rect(*segment), Color::GREEN);
        }
        if let Some(food) = self.food {
            out.draw_rect(Self::tile_rect(food), Color::RED);
        }
        draw_phase_overlay(out, self.phase.phase(), "SNAKE", Vec2::splat(FIELD_SIZE));
    }

    fn start(&mut self) {
        self.board.reset(self.starting_lives);
        self.body = VecDeque::from([START_CELL]);
        self.heading = None;
        self.last_moved = None;
        self.place_food();
        self.phase.start();
    }

    fn toggle_pause(&mut self) -> bool {
        self.phase.toggle_pause()
    }

    fn score(&self) -> Option<ScoreState> {
        Some(self.board.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::{MemoryScoreStore, ScoreStore};
    use rand::SeedableRng;

    fn playing(seed: u64) -> (Snake, MemoryScoreStore) {
        let store = MemoryScoreStore::new();
        let hooks = Hooks {
            store: Box::new(store.clone()),
            display: Box::new(crate::platform::MemoryDisplay::new()),
        };
        let mut game = Snake::new(hooks, &Settings::default(), Pcg32::seed_from_u64(seed));
        game.start();
        // keep food out of the way unless a test places it
        game.food = Some(Cell::new(0, 0));
        (game, store)
    }

    fn press(game: &mut Snake, key: Key) {
        let mut input = InputState::new();
        input.key_down(key);
        game.update(100.0, &input).unwrap();
    }

    fn idle(game: &mut Snake) {
        game.update(100.0, &InputState::new()).unwrap();
    }

    #[test]
    fn test_stationary_until_direction() {
        let (mut game, _) = playing(1);
        idle(&mut game);
        assert_eq!(game.head(), START_CELL);
        press(&mut game, Key::ArrowRight);
        assert_eq!(game.head(), Cell::new(11, 10));
        idle(&mut game);
        assert_eq!(game.head(), Cell::new(12, 10));
    }

    #[test]
    fn test_reversal_is_ignored() {
        let (mut game, _) = playing(1);
        press(&mut game, Key::ArrowRight);
        press(&mut game, Key::ArrowLeft);
        assert_eq!(game.head(), Cell::new(12, 10));
    }

    #[test]
    fn test_reversal_checked_against_last_move() {
        let (mut game, _) = playing(1);
        press(&mut game, Key::ArrowRight);
        // Up then Left before the next move: Left is still a reversal of Right
        let mut input = InputState::new();
        input.key_down(Key::ArrowUp);
        input.key_down(Key::ArrowLeft);
        game.update(100.0, &input).unwrap();
        assert_eq!(game.head(), Cell::new(11, 9));
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let (mut game, store) = playing(7);
        game.food = Some(Cell::new(11, 10));
        press(&mut game, Key::Char('d'));
        assert_eq!(game.length(), 2);
        assert_eq!(game.board.score(), FOOD_POINTS);
        assert_eq!(store.get("snakeHighScore"), Some(FOOD_POINTS));
        let food = game.food().unwrap();
        assert!(!game.body.contains(&food));
        game.food = Some(Cell::new(0, 0));
        idle(&mut game);
        assert_eq!(game.length(), 2);
    }

    #[test]
    fn test_wall_ends_game() {
        let (mut game, _) = playing(1);
        press(&mut game, Key::ArrowUp);
        for _ in 0..9 {
            idle(&mut game);
        }
        assert_eq!(game.head(), Cell::new(10, 0));
        assert!(game.phase.is_playing());
        idle(&mut game);
        assert_eq!(game.phase(), GamePhase::GameOver);
        // further updates do nothing
        idle(&mut game);
        assert_eq!(game.head(), Cell::new(10, 0));
    }

    #[test]
    fn test_biting_body_ends_game() {
        let (mut game, _) = playing(1);
        // tight loop: the head turns onto the tile the tail is leaving
        game.body = VecDeque::from([
            Cell::new(10, 10),
            Cell::new(10, 11),
            Cell::new(11, 11),
            Cell::new(11, 10),
        ]);
        game.heading = Some(Direction::Up);
        game.last_moved = Some(Direction::Up);
        press(&mut game, Key::ArrowRight);
        assert!(game.phase.is_playing());

        // longer body: the tile ahead is still occupied
        game.body = VecDeque::from([
            Cell::new(10, 10),
            Cell::new(10, 11),
            Cell::new(11, 11),
            Cell::new(12, 11),
            Cell::new(12, 10),
            Cell::new(11, 10),
            Cell::new(11, 9),
        ]);
        game.heading = Some(Direction::Up);
        game.last_moved = Some(Direction::Up);
        press(&mut game, Key::ArrowRight);
        assert_eq!(game.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_full_board_ends_game() {
        let (mut game, _) = playing(1);
        let mut body: VecDeque<Cell> = (0..TILE_COUNT)
            .flat_map(|row| (0..TILE_COUNT).map(move |col| Cell::new(col, row)))
            .filter(|c| *c != Cell::new(0, 0))
            .collect();
        // head next to the last free tile, moving left onto it
        body.retain(|c| *c != Cell::new(1, 0));
        body.push_front(Cell::new(1, 0));
        game.body = body;
        game.food = Some(Cell::new(0, 0));
        game.heading = Some(Direction::Left);
        game.last_moved = Some(Direction::Left);
        idle(&mut game);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(game.food(), None);
    }

    #[test]
    fn test_food_placement_is_seeded() {
        let (mut a, _) = playing(42);
        let (mut b, _) = playing(42);
        a.place_food();
        b.place_food();
        assert_eq!(a.food(), b.food());
    }

    #[test]
    fn test_gate_interval() {
        let (game, _) = playing(1);
        assert_eq!(game.step_mode(), StepMode::Gated { interval_ms: 100.0 });
    }
}
