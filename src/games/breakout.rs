//! Breakout: paddle, ball and a wall of bricks

use glam::Vec2;

use super::{Game, GameKind, Hooks, draw_phase_overlay};
use crate::error::Result;
use crate::input::{InputState, Key};
use crate::platform::{Color, Renderer, overlay_text};
use crate::settings::Settings;
use crate::sim::{
    Cell, GamePhase, Grid, GridCell, PhaseMachine, Rect, ScoreState, Scoreboard, StepMode,
    bounce_axis, circle_overlaps_rect, hit_offset, reflect,
};
use crate::step_scale;

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;

pub const PADDLE_WIDTH: f32 = 100.0;
pub const PADDLE_HEIGHT: f32 = 20.0;
pub const PADDLE_Y: f32 = FIELD_HEIGHT - PADDLE_HEIGHT - 10.0;
pub const PADDLE_SPEED: f32 = 10.0;

pub const BALL_RADIUS: f32 = 10.0;
pub const BALL_START_SPEED: f32 = 5.0;

pub const BRICK_COLS: usize = 10;
pub const BRICK_WIDTH: f32 = 75.0;
pub const BRICK_HEIGHT: f32 = 20.0;
pub const BRICK_PADDING: f32 = 10.0;
pub const BRICK_OFFSET: Vec2 = Vec2::new(25.0, 80.0);
pub const MAX_BRICK_ROWS: usize = 8;
pub const BRICK_POINTS: u64 = 10;

const ROW_COLORS: [Color; 7] = [
    Color::hex(0xff0000),
    Color::hex(0xff7f00),
    Color::hex(0xffff00),
    Color::hex(0x00ff00),
    Color::hex(0x0000ff),
    Color::hex(0x4b0082),
    Color::hex(0x9400d3),
];

/// Brick rows for a level: five, plus one every second level, at most eight
pub fn brick_rows(level: u32) -> usize {
    (5 + level as usize / 2).min(MAX_BRICK_ROWS)
}

/// Screen rect of the brick at `cell`
pub fn brick_rect(cell: Cell) -> Rect {
    Rect::new(
        cell.col as f32 * (BRICK_WIDTH + BRICK_PADDING) + BRICK_OFFSET.x,
        cell.row as f32 * (BRICK_HEIGHT + BRICK_PADDING) + BRICK_OFFSET.y,
        BRICK_WIDTH,
        BRICK_HEIGHT,
    )
}

fn build_bricks(rows: usize) -> Grid<GridCell> {
    let mut bricks = Grid::new(BRICK_COLS, rows, GridCell::EMPTY);
    for (cell, brick) in bricks.iter_mut() {
        *brick = GridCell::filled(ROW_COLORS[cell.row as usize % ROW_COLORS.len()]);
    }
    bricks
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ball {
    pos: Vec2,
    vel: Vec2,
}

/// Which input last steered the paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Keys,
    Pointer,
}

#[derive(Debug)]
pub struct Breakout {
    phase: PhaseMachine,
    board: Scoreboard,
    starting_lives: u32,
    step_hz: u32,
    paddle: Rect,
    ball: Ball,
    /// Ball rests on the paddle until launched
    launched: bool,
    start_speed: f32,
    bricks: Grid<GridCell>,
    control: Control,
    pointer_x: f32,
}

impl Breakout {
    pub fn new(hooks: Hooks, settings: &Settings) -> Self {
        let key = GameKind::Breakout.storage_key().unwrap_or("breakoutHighScore");
        let board = Scoreboard::new(key, hooks.store, hooks.display, settings.starting_lives);
        let paddle = Rect::new((FIELD_WIDTH - PADDLE_WIDTH) / 2.0, PADDLE_Y, PADDLE_WIDTH, PADDLE_HEIGHT);
        let mut game = Self {
            phase: PhaseMachine::new(),
            board,
            starting_lives: settings.starting_lives,
            step_hz: settings.fixed_step_hz,
            paddle,
            ball: Ball {
                pos: Vec2::ZERO,
                vel: Vec2::ZERO,
            },
            launched: false,
            start_speed: BALL_START_SPEED,
            bricks: build_bricks(brick_rows(1)),
            control: Control::Keys,
            pointer_x: FIELD_WIDTH / 2.0,
        };
        game.reseat_ball();
        game
    }

    pub fn bricks_left(&self) -> usize {
        self.bricks.iter().filter(|(_, b)| !b.is_empty()).count()
    }

    /// Centre the paddle and park the ball on it, serving up and to the right
    fn reseat_ball(&mut self) {
        self.paddle.x = (FIELD_WIDTH - PADDLE_WIDTH) / 2.0;
        self.launched = false;
        self.ball = Ball {
            pos: Vec2::new(self.paddle.center().x, PADDLE_Y - BALL_RADIUS),
            vel: Vec2::new(self.start_speed, -self.start_speed),
        };
    }

    fn steer(&mut self, input: &InputState, scale: f32) {
        let left = input.is_key_down(Key::ArrowLeft);
        let right = input.is_key_down(Key::ArrowRight);
        if left || right {
            self.control = Control::Keys;
        }
        if input.pointer_moved() {
            let x = input.pointer_position().x;
            if x > 0.0 && x < FIELD_WIDTH {
                self.pointer_x = x;
                self.control = Control::Pointer;
            }
        }

        match self.control {
            Control::Keys => {
                if right {
                    self.paddle.x += PADDLE_SPEED * scale;
                } else if left {
                    self.paddle.x -= PADDLE_SPEED * scale;
                }
            }
            Control::Pointer => self.paddle.x = self.pointer_x - PADDLE_WIDTH / 2.0,
        }
        self.paddle.clamp_x(0.0, FIELD_WIDTH);
    }

    /// Walls, floor, paddle, then at most one brick
    fn resolve_collisions(&mut self) {
        let ball = &mut self.ball;
        if ball.pos.x - BALL_RADIUS < 0.0 {
            ball.pos.x = BALL_RADIUS;
            ball.vel.x = ball.vel.x.abs();
        } else if ball.pos.x + BALL_RADIUS > FIELD_WIDTH {
            ball.pos.x = FIELD_WIDTH - BALL_RADIUS;
            ball.vel.x = -ball.vel.x.abs();
        }
        if ball.pos.y - BALL_RADIUS < 0.0 {
            ball.pos.y = BALL_RADIUS;
            ball.vel.y = ball.vel.y.abs();
        }

        if ball.pos.y + BALL_RADIUS > FIELD_HEIGHT {
            self.ball_lost();
            return;
        }

        let paddle = self.paddle;
        if ball.pos.y + BALL_RADIUS > paddle.y
            && ball.pos.y - BALL_RADIUS < paddle.bottom()
            && ball.pos.x > paddle.x
            && ball.pos.x < paddle.right()
        {
            ball.vel.y = -ball.vel.y.abs();
            ball.vel.x = hit_offset(ball.pos.x, &paddle) * self.start_speed;
            ball.pos.y = paddle.y - BALL_RADIUS;
        }

        // column by column, top to bottom within a column
        let pos = ball.pos;
        let rows = self.bricks.rows() as i32;
        let hit = (0..BRICK_COLS as i32)
            .flat_map(|col| (0..rows).map(move |row| Cell::new(col, row)))
            .filter(|cell| self.bricks.get(*cell).is_some_and(|b| !b.is_empty()))
            .map(|cell| (cell, brick_rect(cell)))
            .find(|(_, rect)| circle_overlaps_rect(pos, BALL_RADIUS, rect));

        if let Some((cell, rect)) = hit {
            self.ball.vel = reflect(self.ball.vel, bounce_axis(pos, &rect));
            self.bricks.set(cell, GridCell::EMPTY);
            self.board.award(BRICK_POINTS * self.board.level() as u64);
            if self.bricks_left() == 0 {
                self.next_level();
            }
        }
    }

    fn ball_lost(&mut self) {
        let lives = self.board.lose_life();
        log::debug!("breakout: ball lost, {} lives left", lives);
        if lives == 0 {
            self.phase.game_over();
        } else {
            self.reseat_ball();
        }
    }

    fn next_level(&mut self) {
        let level = self.board.next_level();
        self.start_speed += 1.0;
        let vel = self.ball.vel;
        self.reseat_ball();
        // keep travel direction, bump magnitude
        let s = self.start_speed;
        self.ball.vel = Vec2::new(
            if vel.x > 0.0 { s } else { -s },
            if vel.y > 0.0 { s } else { -s },
        );
        self.bricks = build_bricks(brick_rows(level));
    }
}

impl Game for Breakout {
    fn kind(&self) -> GameKind {
        GameKind::Breakout
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
        let scale = step_scale(dt_ms);
        self.steer(input, scale);

        if !self.launched {
            if input.is_key_just_pressed(Key::Space) {
                self.launched = true;
            } else {
                self.ball.pos.x = self.paddle.center().x;
                return Ok(());
            }
        }

        self.ball.pos += self.ball.vel * scale;
        self.resolve_collisions();
        Ok(())
    }

    fn render(&self, out: &mut dyn Renderer) {
        out.clear();
        out.draw_circle(self.ball.pos, BALL_RADIUS, Color::WHITE);
        out.draw_rect(self.paddle, Color::CYAN);
        for (cell, brick) in self.bricks.iter() {
            if !brick.is_empty() {
                out.draw_rect(brick_rect(cell), brick.color);
            }
        }

        let size = Vec2::new(FIELD_WIDTH, FIELD_HEIGHT);
        if self.phase.is_playing() && !self.launched {
            overlay_text(out, "Press SPACE to launch", size * 0.5, Color::WHITE, 16.0);
        }
        draw_phase_overlay(out, self.phase.phase(), "BREAKOUT", size);
    }

    fn start(&mut self) {
        self.board.reset(self.starting_lives);
        self.start_speed = BALL_START_SPEED;
        self.bricks = build_bricks(brick_rows(1));
        self.control = Control::Keys;
        self.reseat_ball();
        self.phase.start();
    }

    fn toggle_pause(&mut self) -> bool {
        self.phase.toggle_pause()
    }

    fn score(&self) -> Option<ScoreState> {
        Some(self.board.state())
    }
}
