//! Space Invaders: a marching formation, barriers and a mothership

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{Game, GameKind, Hooks, draw_phase_overlay};
use crate::error::Result;
use crate::input::{InputState, Key};
use crate::platform::{Color, Renderer};
use crate::settings::Settings;
use crate::sim::{GamePhase, PhaseMachine, Rect, ScoreState, Scoreboard, StepMode, overlap};

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;

// === Player ===
pub const PLAYER_WIDTH: f32 = 50.0;
pub const PLAYER_HEIGHT: f32 = 30.0;
pub const PLAYER_Y: f32 = FIELD_HEIGHT - 60.0;
pub const PLAYER_SPEED: f32 = 5.0;
pub const FIRE_COOLDOWN_MS: f32 = 500.0;

// === Bullets ===
pub const BULLET_WIDTH: f32 = 4.0;
pub const BULLET_HEIGHT: f32 = 15.0;
pub const PLAYER_BULLET_SPEED: f32 = 7.0;
pub const ENEMY_BULLET_SPEED: f32 = 5.0;
pub const ENEMY_FIRE_MS: f32 = 1500.0;

// === Formation ===
pub const FORMATION_ROWS: usize = 5;
pub const FORMATION_COLS: usize = 11;
pub const ENEMY_WIDTH: f32 = 40.0;
pub const ENEMY_HEIGHT: f32 = 30.0;
pub const ENEMY_PADDING: f32 = 10.0;
pub const FORMATION_TOP: f32 = 80.0;
pub const MARCH_STEP: f32 = 10.0;
pub const MARCH_DROP: f32 = 20.0;

// === Mothership ===
pub const MOTHERSHIP_MS: f32 = 15_000.0;
pub const MOTHERSHIP_WIDTH: f32 = 60.0;
pub const MOTHERSHIP_HEIGHT: f32 = 30.0;
pub const MOTHERSHIP_Y: f32 = 40.0;
pub const MOTHERSHIP_SPEED: f32 = 2.0;
pub const MOTHERSHIP_POINTS: u64 = 100;

// === Barriers ===
pub const BARRIER_COUNT: usize = 4;
pub const BARRIER_WIDTH: f32 = 80.0;
pub const BARRIER_HEIGHT: f32 = 60.0;
pub const BARRIER_Y: f32 = FIELD_HEIGHT - 150.0;
pub const BARRIER_HEALTH: i32 = 100;
pub const BARRIER_DAMAGE: i32 = 10;

const FIRE_KEYS: [Key; 1] = [Key::Space];

/// Milliseconds between formation steps
pub fn march_interval_ms(level: u32) -> f32 {
    (1000.0 - (level.max(1) - 1) as f32 * 100.0).max(100.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Invader {
    pub rect: Rect,
    pub row: usize,
    pub points: u64,
    pub alive: bool,
}

impl Invader {
    fn color(&self) -> Color {
        match self.row {
            0 => Color::hex(0xff00ff),
            1 | 2 => Color::CYAN,
            _ => Color::GREEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barrier {
    pub rect: Rect,
    pub health: i32,
}

impl Barrier {
    pub fn is_standing(&self) -> bool {
        self.health > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mothership {
    pub rect: Rect,
    /// Signed horizontal speed
    pub speed: f32,
}

fn formation() -> Vec<Invader> {
    let pitch_x = ENEMY_WIDTH + ENEMY_PADDING;
    let pitch_y = ENEMY_HEIGHT + ENEMY_PADDING;
    let left = (FIELD_WIDTH - FORMATION_COLS as f32 * pitch_x) / 2.0;
    (0..FORMATION_ROWS)
        .flat_map(|row| {
            (0..FORMATION_COLS).map(move |col| Invader {
                rect: Rect::new(
                    left + col as f32 * pitch_x,
                    FORMATION_TOP + row as f32 * pitch_y,
                    ENEMY_WIDTH,
                    ENEMY_HEIGHT,
                ),
                row,
                points: (FORMATION_ROWS - row) as u64 * 10,
                alive: true,
            })
        })
        .collect()
}

fn barriers() -> Vec<Barrier> {
    let gap = (FIELD_WIDTH - BARRIER_COUNT as f32 * BARRIER_WIDTH) / (BARRIER_COUNT + 1) as f32;
    (0..BARRIER_COUNT)
        .map(|i| Barrier {
            rect: Rect::new(
                (i + 1) as f32 * gap + i as f32 * BARRIER_WIDTH,
                BARRIER_Y,
                BARRIER_WIDTH,
                BARRIER_HEIGHT,
            ),
            health: BARRIER_HEALTH,
        })
        .collect()
}

fn player_start() -> Rect {
    Rect::new((FIELD_WIDTH - PLAYER_WIDTH) / 2.0, PLAYER_Y, PLAYER_WIDTH, PLAYER_HEIGHT)
}

#[derive(Debug)]
pub struct SpaceInvaders {
    phase: PhaseMachine,
    board: Scoreboard,
    rng: Pcg32,
    starting_lives: u32,

    player: Rect,
    since_fire_ms: f32,
    player_bullets: Vec<Rect>,
    enemy_bullets: Vec<Rect>,

    invaders: Vec<Invader>,
    /// +1 marching right, -1 left
    march_dir: f32,
    march_timer: f32,
    enemy_fire_timer: f32,

    barriers: Vec<Barrier>,
    mothership: Option<Mothership>,
    mothership_timer: f32,
}

impl SpaceInvaders {
    pub fn new(hooks: Hooks, settings: &Settings, rng: Pcg32) -> Self {
        let key = GameKind::SpaceInvaders
            .storage_key()
            .unwrap_or("spaceInvadersHighScore");
        Self {
            phase: PhaseMachine::new(),
            board: Scoreboard::new(key, hooks.store, hooks.display, settings.starting_lives),
            rng,
            starting_lives: settings.starting_lives,
            player: player_start(),
            since_fire_ms: FIRE_COOLDOWN_MS,
            player_bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            invaders: formation(),
            march_dir: 1.0,
            march_timer: 0.0,
            enemy_fire_timer: 0.0,
            barriers: barriers(),
            mothership: None,
            mothership_timer: 0.0,
        }
    }

    pub fn player(&self) -> Rect {
        self.player
    }

    pub fn invaders(&self) -> &[Invader] {
        &self.invaders
    }

    pub fn barriers(&self) -> &[Barrier] {
        &self.barriers
    }

    pub fn mothership(&self) -> Option<&Mothership> {
        self.mothership.as_ref()
    }

    pub fn alive(&self) -> usize {
        self.invaders.iter().filter(|e| e.alive).count()
    }

    /// Rebuild the formation, barriers and timers for the current level
    fn build_level(&mut self) {
        self.player = player_start();
        self.since_fire_ms = FIRE_COOLDOWN_MS;
        self.player_bullets.clear();
        self.enemy_bullets.clear();
        self.invaders = formation();
        self.march_dir = 1.0;
        self.march_timer = 0.0;
        self.enemy_fire_timer = 0.0;
        self.barriers = barriers();
        self.mothership = None;
        self.mothership_timer = 0.0;
    }

    fn move_player(&mut self, dt_ms: f32, scale: f32, input: &InputState) {
        if input.is_key_down(Key::ArrowLeft) {
            self.player.x -= PLAYER_SPEED * scale;
        }
        if input.is_key_down(Key::ArrowRight) {
            self.player.x += PLAYER_SPEED * scale;
        }
        self.player.clamp_x(0.0, FIELD_WIDTH);

        self.since_fire_ms += dt_ms;
        if input.any_down(&FIRE_KEYS) && self.since_fire_ms > FIRE_COOLDOWN_MS {
            self.since_fire_ms = 0.0;
            self.player_bullets.push(Rect::new(
                self.player.center().x - BULLET_WIDTH / 2.0,
                self.player.y,
                BULLET_WIDTH,
                BULLET_HEIGHT,
            ));
        }
    }

    fn move_bullets(&mut self, dt_ms: f32, scale: f32) {
        for bullet in &mut self.player_bullets {
            bullet.y -= PLAYER_BULLET_SPEED * scale;
        }
        self.player_bullets.retain(|b| b.bottom() >= 0.0);
        for bullet in &mut self.enemy_bullets {
            bullet.y += ENEMY_BULLET_SPEED * scale;
        }
        self.enemy_bullets.retain(|b| b.y <= FIELD_HEIGHT);

        self.enemy_fire_timer += dt_ms;
        if self.enemy_fire_timer > ENEMY_FIRE_MS {
            self.enemy_fire_timer = 0.0;
            let shooters: Vec<Rect> = self.invaders.iter().filter(|e| e.alive).map(|e| e.rect).collect();
            if !shooters.is_empty() {
                let shooter = shooters[self.rng.random_range(0..shooters.len())];
                self.enemy_bullets.push(Rect::new(
                    shooter.center().x - BULLET_WIDTH / 2.0,
                    shooter.bottom(),
                    BULLET_WIDTH,
                    BULLET_HEIGHT,
                ));
            }
        }
    }

    /// Step sideways; at an edge drop instead and turn around
    fn march(&mut self, dt_ms: f32) {
        self.march_timer += dt_ms;
        if self.march_timer <= march_interval_ms(self.board.level()) {
            return;
        }
        self.march_timer = 0.0;

        let dir = self.march_dir;
        let at_edge = self.invaders.iter().filter(|e| e.alive).any(|e| {
            (dir > 0.0 && e.rect.right() + MARCH_STEP > FIELD_WIDTH)
                || (dir < 0.0 && e.rect.x - MARCH_STEP < 0.0)
        });
        let delta = if at_edge {
            Vec2::new(0.0, MARCH_DROP)
        } else {
            Vec2::new(dir * MARCH_STEP, 0.0)
        };
        for invader in self.invaders.iter_mut().filter(|e| e.alive) {
            invader.rect.translate(delta);
        }
        if at_edge {
            self.march_dir = -dir;
        }
    }

    fn move_mothership(&mut self, dt_ms: f32, scale: f32) {
        self.mothership_timer += dt_ms;
        if self.mothership.is_none() && self.mothership_timer > MOTHERSHIP_MS {
            self.mothership_timer = 0.0;
            let from_right = self.rng.random::<bool>();
            let (x, speed) = if from_right {
                (FIELD_WIDTH, -MOTHERSHIP_SPEED)
            } else {
                (-MOTHERSHIP_WIDTH, MOTHERSHIP_SPEED)
            };
            log::debug!("invaders: mothership from the {}", if from_right { "right" } else { "left" });
            self.mothership = Some(Mothership {
                rect: Rect::new(x, MOTHERSHIP_Y, MOTHERSHIP_WIDTH, MOTHERSHIP_HEIGHT),
                speed,
            });
        }

        if let Some(ship) = &mut self.mothership {
            ship.rect.x += ship.speed * scale;
            let gone = (ship.speed > 0.0 && ship.rect.x > FIELD_WIDTH)
                || (ship.speed < 0.0 && ship.rect.right() < 0.0);
            if gone {
                self.mothership = None;
            }
        }
    }

    /// A player bullet stops at the first thing it hits
    fn resolve_player_bullets(&mut self) {
        let bullets = std::mem::take(&mut self.player_bullets);
        for bullet in bullets {
            if let Some(invader) = self
                .invaders
                .iter_mut()
                .find(|e| e.alive && overlap(&bullet, &e.rect))
            {
                invader.alive = false;
                let points = invader.points;
                self.board.award(points);
                continue;
            }
            if self
                .mothership
                .is_some_and(|ship| overlap(&bullet, &ship.rect))
            {
                self.mothership = None;
                self.board.award(MOTHERSHIP_POINTS);
                continue;
            }
            if let Some(barrier) = self
                .barriers
                .iter_mut()
                .find(|b| b.is_standing() && overlap(&bullet, &b.rect))
            {
                barrier.health -= BARRIER_DAMAGE;
                continue;
            }
            self.player_bullets.push(bullet);
        }
    }

    fn resolve_enemy_bullets(&mut self) {
        let bullets = std::mem::take(&mut self.enemy_bullets);
        let mut player_hit = false;
        for bullet in bullets {
            if !player_hit && overlap(&bullet, &self.player) {
                player_hit = true;
                let lives = self.board.lose_life();
                log::info!("invaders: player hit, {} lives left", lives);
                self.player = player_start();
                continue;
            }
            if let Some(barrier) = self
                .barriers
                .iter_mut()
                .find(|b| b.is_standing() && overlap(&bullet, &b.rect))
            {
                barrier.health -= BARRIER_DAMAGE;
                continue;
            }
            self.enemy_bullets.push(bullet);
        }
    }

    fn resolve_contact(&mut self) {
        for invader in self.invaders.iter().filter(|e| e.alive) {
            for barrier in &mut self.barriers {
                if barrier.is_standing() && overlap(&invader.rect, &barrier.rect) {
                    barrier.health = 0;
                }
            }
        }
        let touching = self
            .invaders
            .iter()
            .any(|e| e.alive && overlap(&e.rect, &self.player));
        if touching {
            self.board.set_lives(0);
        }
    }

    fn check_status(&mut self) {
        if self.alive() == 0 {
            let level = self.board.next_level();
            log::info!("invaders: wave cleared, level {}", level);
            self.build_level();
            return;
        }
        let landed = self
            .invaders
            .iter()
            .any(|e| e.alive && e.rect.bottom() > self.player.y);
        if self.board.lives() == 0 || landed {
            log::info!("invaders: game over at {}", self.board.score());
            self.phase.game_over();
        }
    }
}

impl Game for SpaceInvaders {
    fn kind(&self) -> GameKind {
        GameKind::SpaceInvaders
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
        let scale = crate::step_scale(dt_ms);

        self.move_player(dt_ms, scale, input);
        self.move_bullets(dt_ms, scale);
        self.march(dt_ms);
        self.move_mothership(dt_ms, scale);

        self.resolve_player_bullets();
        self.resolve_enemy_bullets();
        self.resolve_contact();
        self.check_status();
        Ok(())
    }

    fn render(&self, out: &mut dyn Renderer) {
        out.clear();
        out.draw_rect(Rect::new(0.0, 0.0, FIELD_WIDTH, FIELD_HEIGHT), Color::BLACK);

        out.draw_rect(self.player, Color::GREEN);
        out.draw_rect(
            Rect::new(self.player.center().x - 3.0, self.player.y - 10.0, 6.0, 10.0),
            Color::GREEN,
        );
        for invader in self.invaders.iter().filter(|e| e.alive) {
            out.draw_rect(invader.rect, invader.color());
        }
        for barrier in self.barriers.iter().filter(|b| b.is_standing()) {
            let alpha = barrier.health as f32 / BARRIER_HEALTH as f32;
            out.draw_rect(barrier.rect, Color::GREEN.with_alpha(alpha));
        }
        if let Some(ship) = &self.mothership {
            out.draw_rect(ship.rect, Color::RED);
        }
        for bullet in &self.player_bullets {
            out.draw_rect(*bullet, Color::GREEN);
        }
        for bullet in &self.enemy_bullets {
            out.draw_rect(*bullet, Color::RED);
        }
        draw_phase_overlay(
            out,
            self.phase.phase(),
            "SPACE INVADERS",
            Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
        );
    }

    fn start(&mut self) {
        self.board.reset(self.starting_lives);
        self.build_level();
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
    use crate::consts::REFERENCE_STEP_MS;
    use crate::highscores::{MemoryScoreStore, ScoreStore};
    use crate::platform::MemoryDisplay;
    use rand::SeedableRng;

    fn playing() -> (SpaceInvaders, MemoryScoreStore) {
        let store = MemoryScoreStore::new();
        let hooks = Hooks {
            store: Box::new(store.clone()),
            display: Box::new(MemoryDisplay::new()),
        };
        let mut game = SpaceInvaders::new(hooks, &Settings::default(), Pcg32::seed_from_u64(9));
        game.start();
        (game, store)
    }

    fn holding(key: Key) -> InputState {
        let mut input = InputState::new();
        input.key_down(key);
        input
    }

    fn bullet_at(center: Vec2) -> Rect {
        Rect::centered(center, BULLET_WIDTH, BULLET_HEIGHT)
    }

    #[test]
    fn test_level_layout() {
        let (game, _) = playing();
        assert_eq!(game.invaders().len(), FORMATION_ROWS * FORMATION_COLS);
        assert_eq!(game.invaders()[0].points, 50);
        assert_eq!(game.invaders().last().unwrap().points, 10);
        assert_eq!(game.invaders()[0].rect.x, 125.0);
        let xs: Vec<f32> = game.barriers().iter().map(|b| b.rect.x).collect();
        assert_eq!(xs, vec![96.0, 272.0, 448.0, 624.0]);
        assert_eq!(game.player().x, 375.0);
    }

    #[test]
    fn test_march_interval_by_level() {
        assert_eq!(march_interval_ms(1), 1000.0);
        assert_eq!(march_interval_ms(4), 700.0);
        assert_eq!(march_interval_ms(12), 100.0);
    }

    #[test]
    fn test_player_moves_and_stays_on_field() {
        let (mut game, _) = playing();
        let input = holding(Key::ArrowLeft);
        game.update(REFERENCE_STEP_MS, &input).unwrap();
        assert_eq!(game.player().x, 370.0);
        for _ in 0..200 {
            game.update(REFERENCE_STEP_MS, &input).unwrap();
        }
        assert_eq!(game.player().x, 0.0);
    }

    #[test]
    fn test_fire_cooldown() {
        let (mut game, _) = playing();
        let input = holding(Key::Space);
        game.update(REFERENCE_STEP_MS, &input).unwrap();
        assert_eq!(game.player_bullets.len(), 1);
        game.update(REFERENCE_STEP_MS, &input).unwrap();
        assert_eq!(game.player_bullets.len(), 1);
        game.update(500.0, &input).unwrap();
        assert_eq!(game.player_bullets.len(), 2);
    }

    #[test]
    fn test_formation_steps_then_drops_and_turns() {
        let (mut game, _) = playing();
        let x0 = game.invaders()[0].rect.x;
        game.march(1000.0);
        assert_eq!(game.invaders()[0].rect.x, x0);
        game.march(1.0);
        assert_eq!(game.invaders()[0].rect.x, x0 + MARCH_STEP);

        // push the formation against the right edge
        for invader in &mut game.invaders {
            invader.rect.translate(Vec2::new(120.0, 0.0));
        }
        let y0 = game.invaders()[0].rect.y;
        game.march(1001.0);
        assert_eq!(game.invaders()[0].rect.y, y0 + MARCH_DROP);
        assert_eq!(game.march_dir, -1.0);
        game.march(1001.0);
        assert_eq!(game.invaders()[0].rect.x, x0 + 120.0);
    }

    #[test]
    fn test_bullet_kills_one_target() {
        let (mut game, store) = playing();
        let target = game.invaders()[FORMATION_COLS].rect;
        // a bullet overlapping two stacked invaders
        game.player_bullets.push(Rect::new(target.x + 10.0, target.y - 15.0, BULLET_WIDTH, 30.0));
        game.resolve_player_bullets();
        assert_eq!(game.alive(), FORMATION_ROWS * FORMATION_COLS - 1);
        assert!(game.player_bullets.is_empty());
        assert_eq!(game.board.score(), 50);
        assert_eq!(store.get("spaceInvadersHighScore"), Some(50));
    }

    #[test]
    fn test_bullet_damages_barrier_once() {
        let (mut game, _) = playing();
        let barrier = game.barriers()[1].rect;
        game.player_bullets.push(bullet_at(barrier.center()));
        game.resolve_player_bullets();
        assert_eq!(game.barriers()[1].health, BARRIER_HEALTH - BARRIER_DAMAGE);
        assert!(game.player_bullets.is_empty());
    }

    #[test]
    fn test_destroyed_barrier_lets_bullets_through() {
        let (mut game, _) = playing();
        game.barriers[0].health = 0;
        let barrier = game.barriers()[0].rect;
        game.enemy_bullets.push(bullet_at(barrier.center()));
        game.resolve_enemy_bullets();
        assert_eq!(game.enemy_bullets.len(), 1);
        assert_eq!(game.barriers()[0].health, 0);
    }

    #[test]
    fn test_mothership_hit() {
        let (mut game, _) = playing();
        game.mothership = Some(Mothership {
            rect: Rect::new(300.0, MOTHERSHIP_Y, MOTHERSHIP_WIDTH, MOTHERSHIP_HEIGHT),
            speed: MOTHERSHIP_SPEED,
        });
        game.player_bullets.push(bullet_at(Vec2::new(330.0, MOTHERSHIP_Y + 15.0)));
        game.resolve_player_bullets();
        assert!(game.mothership().is_none());
        assert_eq!(game.board.score(), MOTHERSHIP_POINTS);
    }

    #[test]
    fn test_mothership_arrives_and_leaves() {
        let (mut game, _) = playing();
        game.move_mothership(MOTHERSHIP_MS, 1.0);
        assert!(game.mothership().is_none());
        game.move_mothership(1.0, 1.0);
        let ship = *game.mothership().unwrap();
        assert_eq!(ship.speed.abs(), MOTHERSHIP_SPEED);
        for _ in 0..500 {
            game.move_mothership(0.0, 1.0);
        }
        assert!(game.mothership().is_none());
    }

    #[test]
    fn test_enemy_bullet_costs_life_and_recentres() {
        let (mut game, _) = playing();
        game.player.x = 100.0;
        let at = game.player().center();
        game.enemy_bullets.push(bullet_at(at));
        game.enemy_bullets.push(bullet_at(at));
        game.resolve_enemy_bullets();
        assert_eq!(game.board.lives(), 2);
        assert_eq!(game.player(), player_start());
    }

    #[test]
    fn test_enemy_fire_uses_living_invaders() {
        let (mut game, _) = playing();
        for invader in game.invaders.iter_mut().skip(1) {
            invader.alive = false;
        }
        game.move_bullets(ENEMY_FIRE_MS + 1.0, 1.0);
        assert_eq!(game.enemy_bullets.len(), 1);
        let shooter = game.invaders()[0].rect;
        assert_eq!(game.enemy_bullets[0].y, shooter.bottom());
    }

    #[test]
    fn test_invader_contact_ends_game() {
        let (mut game, _) = playing();
        game.invaders[0].rect = game.player();
        game.update(0.0, &InputState::new()).unwrap();
        assert_eq!(game.board.lives(), 0);
        assert_eq!(game.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_invaders_flatten_barriers() {
        let (mut game, _) = playing();
        game.invaders[0].rect = game.barriers()[2].rect;
        game.resolve_contact();
        assert!(!game.barriers()[2].is_standing());
    }

    #[test]
    fn test_wave_cleared_advances_level() {
        let (mut game, _) = playing();
        for invader in &mut game.invaders {
            invader.alive = false;
        }
        game.update(0.0, &InputState::new()).unwrap();
        assert_eq!(game.board.level(), 2);
        assert_eq!(game.alive(), FORMATION_ROWS * FORMATION_COLS);
        assert!(game.phase.is_playing());
    }
}
