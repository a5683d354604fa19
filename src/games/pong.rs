//! Pong against a computer paddle

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{Game, GameKind, Hooks, draw_phase_overlay};
use crate::error::Result;
use crate::input::{InputState, Key};
use crate::platform::{Color, Display, HudField, Renderer, overlay_text};
use crate::settings::Settings;
use crate::sim::{GamePhase, PhaseMachine, Rect, StepMode};
use crate::step_scale;

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
/// Shorter side of the field; paddle and ball sizes scale with it
const SHORT_SIDE: f32 = FIELD_HEIGHT;

pub const PADDLE_WIDTH: f32 = SHORT_SIDE * 0.015;
pub const PADDLE_HEIGHT: f32 = SHORT_SIDE * 0.15;
pub const PLAYER_SPEED: f32 = 8.0;
pub const COMPUTER_SPEED: f32 = 5.0;

pub const BALL_RADIUS: f32 = SHORT_SIDE * 0.01;
pub const SERVE_VELOCITY: Vec2 = Vec2::new(5.0, 5.0);
/// Speed added to the ball on every paddle return
pub const RETURN_SPEEDUP: f32 = 0.5;
/// Vertical deflection per pixel of hit offset from the paddle centre
pub const DEFLECTION: f32 = 0.1;

/// Longest computer reaction delay in seconds at difficulty 1
const MAX_REACTION_DELAY: f32 = 0.15;
/// Aim error as a fraction of paddle height
const AIM_ERROR: f32 = 0.1;
/// Reference steps the computer looks ahead
const PREDICTION_STEPS: usize = 3;
/// Computer holds still while the target is this close to its centre
const DEAD_ZONE: f32 = 35.0;

const UP_KEYS: [Key; 2] = [Key::ArrowUp, Key::Char('w')];
const DOWN_KEYS: [Key; 2] = [Key::ArrowDown, Key::Char('s')];

/// Computer paddle state
#[derive(Debug, Clone)]
struct Opponent {
    reaction_delay: f32,
    reaction_timer: f32,
}

pub struct Pong {
    phase: PhaseMachine,
    display: Box<dyn Display>,
    rng: Pcg32,
    step_hz: u32,
    winning_score: u32,
    player: Rect,
    computer: Rect,
    ball_pos: Vec2,
    ball_vel: Vec2,
    player_score: u32,
    computer_score: u32,
    opponent: Opponent,
}

impl std::fmt::Debug for Pong {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pong")
            .field("phase", &self.phase)
            .field("player_score", &self.player_score)
            .field("computer_score", &self.computer_score)
            .finish_non_exhaustive()
    }
}

impl Pong {
    pub fn new(hooks: Hooks, settings: &Settings, rng: Pcg32) -> Self {
        let paddle_y = (FIELD_HEIGHT - PADDLE_HEIGHT) / 2.0;
        let mut game = Self {
            phase: PhaseMachine::new(),
            display: hooks.display,
            rng,
            step_hz: settings.fixed_step_hz,
            winning_score: settings.pong_winning_score,
            player: Rect::new(FIELD_WIDTH * 0.05, paddle_y, PADDLE_WIDTH, PADDLE_HEIGHT),
            computer: Rect::new(FIELD_WIDTH * 0.95 - PADDLE_WIDTH, paddle_y, PADDLE_WIDTH, PADDLE_HEIGHT),
            ball_pos: Vec2::ZERO,
            ball_vel: Vec2::ZERO,
            player_score: 0,
            computer_score: 0,
            opponent: Opponent {
                reaction_delay: 0.0,
                reaction_timer: 0.0,
            },
        };
        game.serve();
        game.publish();
        game
    }

    /// (player, computer)
    pub fn scores(&self) -> (u32, u32) {
        (self.player_score, self.computer_score)
    }

    /// AI speed and accuracy multiplier; grows while the computer leads
    fn difficulty(&self) -> f32 {
        1.0 + self.computer_score.saturating_sub(self.player_score) as f32 * 0.1
    }

    fn serve(&mut self) {
        self.ball_pos = Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0);
        self.ball_vel = SERVE_VELOCITY;
        self.player.y = (FIELD_HEIGHT - PADDLE_HEIGHT) / 2.0;
        self.computer.y = (FIELD_HEIGHT - PADDLE_HEIGHT) / 2.0;
        self.opponent.reaction_timer = 0.0;
        self.opponent.reaction_delay = self.rng.random::<f32>() * MAX_REACTION_DELAY / self.difficulty();
    }

    fn publish(&mut self) {
        self.display.set_field(HudField::PlayerScore, self.player_score as u64);
        self.display.set_field(HudField::ComputerScore, self.computer_score as u64);
    }

    /// Ball position a few reference steps ahead, bouncing off top and bottom
    fn predict_ball(&self) -> Vec2 {
        let mut pos = self.ball_pos;
        let mut vel = self.ball_vel;
        for _ in 0..PREDICTION_STEPS {
            pos += vel;
            if pos.y < 0.0 || pos.y > FIELD_HEIGHT {
                vel.y = -vel.y;
            }
        }
        pos
    }

    fn move_player(&mut self, input: &InputState, scale: f32) {
        if input.any_down(&UP_KEYS) {
            self.player.y -= PLAYER_SPEED * scale;
        }
        if input.any_down(&DOWN_KEYS) {
            self.player.y += PLAYER_SPEED * scale;
        }
        self.player.clamp_y(0.0, FIELD_HEIGHT);
    }

    fn move_computer(&mut self, dt_ms: f32, scale: f32) {
        self.opponent.reaction_timer += dt_ms / 1000.0;
        if self.opponent.reaction_timer < self.opponent.reaction_delay {
            return;
        }
        let difficulty = self.difficulty();
        let jitter = (self.rng.random::<f32>() - 0.5) * PADDLE_HEIGHT * AIM_ERROR / difficulty;
        let target_y = self.predict_ball().y + jitter;
        let center = self.computer.center().y;
        let speed = COMPUTER_SPEED * difficulty * scale;
        if center < target_y - DEAD_ZONE {
            self.computer.y += speed;
        } else if center > target_y + DEAD_ZONE {
            self.computer.y -= speed;
        }
        self.computer.clamp_y(0.0, FIELD_HEIGHT);

        self.opponent.reaction_timer = 0.0;
        self.opponent.reaction_delay = self.rng.random::<f32>() * MAX_REACTION_DELAY / difficulty;
    }

    fn bounce_ball(&mut self) {
        let (pos, vel) = (&mut self.ball_pos, &mut self.ball_vel);
        if pos.y - BALL_RADIUS < 0.0 {
            vel.y = vel.y.abs();
        } else if pos.y + BALL_RADIUS > FIELD_HEIGHT {
            vel.y = -vel.y.abs();
        }

        let paddle = if vel.x < 0.0 { self.player } else { self.computer };
        let in_reach = pos.x - BALL_RADIUS < paddle.right()
            && pos.x + BALL_RADIUS > paddle.x
            && pos.y > paddle.y
            && pos.y < paddle.bottom();
        if in_reach {
            vel.x = -vel.x - RETURN_SPEEDUP * vel.x.signum();
            vel.y += (pos.y - paddle.center().y) * DEFLECTION;
        }
    }

    fn check_point(&mut self) {
        let scorer = if self.ball_pos.x - BALL_RADIUS < 0.0 {
            &mut self.computer_score
        } else if self.ball_pos.x + BALL_RADIUS > FIELD_WIDTH {
            &mut self.player_score
        } else {
            return;
        };
        *scorer += 1;
        log::debug!("pong: {} - {}", self.player_score, self.computer_score);
        self.publish();

        if self.player_score.max(self.computer_score) >= self.winning_score {
            log::info!("pong: match over {} - {}", self.player_score, self.computer_score);
            self.phase.game_over();
        } else {
            self.serve();
        }
    }
}

impl Game for Pong {
    fn kind(&self) -> GameKind {
        GameKind::Pong
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
        self.move_player(input, scale);
        self.move_computer(dt_ms, scale);
        self.ball_pos += self.ball_vel * scale;
        self.bounce_ball();
        self.check_point();
        Ok(())
    }

    fn render(&self, out: &mut dyn Renderer) {
        out.clear();
        out.draw_rect(Rect::new(0.0, 0.0, FIELD_WIDTH, FIELD_HEIGHT), Color::BLACK);
        // dashed centre line
        let mut y = 0.0;
        while y < FIELD_HEIGHT {
            out.draw_rect(Rect::new(FIELD_WIDTH / 2.0 - 1.0, y, 2.0, 10.0), Color::WHITE);
            y += 20.0;
        }
        out.draw_circle(self.ball_pos, BALL_RADIUS, Color::WHITE);
        out.draw_rect(self.player, Color::WHITE);
        out.draw_rect(self.computer, Color::WHITE);

        let size = Vec2::new(FIELD_WIDTH, FIELD_HEIGHT);
        if self.phase.phase() == GamePhase::GameOver {
            let banner = if self.player_score > self.computer_score {
                "YOU WIN"
            } else {
                "COMPUTER WINS"
            };
            overlay_text(out, banner, size * 0.5 - Vec2::new(0.0, 60.0), Color::YELLOW, 24.0);
        }
        draw_phase_overlay(out, self.phase.phase(), "PONG", size);
    }

    fn start(&mut self) {
        self.player_score = 0;
        self.computer_score = 0;
        self.serve();
        self.publish();
        self.phase.start();
    }

    fn toggle_pause(&mut self) -> bool {
        self.phase.toggle_pause()
    }
}
