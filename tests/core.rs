//! Collision, grid and scoring behaviour through the public `sim` API

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use retro_arcade::games::pacman::MazeLayout;
use retro_arcade::games::{Game, Hooks, PacMan};
use retro_arcade::input::{InputState, Key};
use retro_arcade::platform::{Color, HudField, MemoryDisplay};
use retro_arcade::sim::{
    Cell, Direction, GamePhase, Grid, GridCell, GridMover, Rect, Scoreboard, overlap,
};
use retro_arcade::{MemoryScoreStore, ScoreStore, Settings};

fn rect() -> impl Strategy<Value = Rect> {
    (-500.0f32..500.0, -500.0f32..500.0, 1.0f32..200.0, 1.0f32..200.0)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn overlap_is_symmetric(a in rect(), b in rect()) {
        prop_assert_eq!(overlap(&a, &b), overlap(&b, &a));
    }

    #[test]
    fn overlap_matches_positive_intersection(a in rect(), b in rect()) {
        prop_assert_eq!(overlap(&a, &b), a.intersection_area(&b) > 0.0);
    }

    #[test]
    fn edge_contact_is_not_overlap(a in rect(), h in 1.0f32..50.0) {
        let below = Rect::new(a.x, a.bottom(), a.width, h);
        let beside = Rect::new(a.right(), a.y, 10.0, a.height);
        prop_assert!(!overlap(&a, &below));
        prop_assert!(!overlap(&a, &beside));
    }

    #[test]
    fn collapse_keeps_dimensions(row in 0usize..20) {
        let mut grid = Grid::new(10, 20, GridCell::filled(Color::RED));
        grid.collapse_row(row, GridCell::EMPTY);
        prop_assert_eq!(grid.rows(), 20);
        prop_assert_eq!(grid.cols(), 10);
        prop_assert!(grid.row(0).iter().all(|c| c.is_empty()));
        prop_assert!(grid.row(19).iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn score_never_decreases(awards in proptest::collection::vec(0u64..500, 0..40)) {
        let store = MemoryScoreStore::new();
        let mut board = Scoreboard::new(
            "propHighScore",
            Box::new(store.clone()),
            Box::new(MemoryDisplay::new()),
            3,
        );
        let mut last = 0;
        for points in awards {
            board.award(points);
            prop_assert!(board.score() >= last);
            prop_assert!(board.high_score() >= board.score());
            last = board.score();
        }
        if last > 0 {
            prop_assert_eq!(store.get("propHighScore"), Some(last));
        }
    }
}

#[test]
fn line_clear_shifts_rows_above_down() {
    let marker = GridCell::filled(Color::BLUE);
    let mut grid = Grid::new(10, 20, GridCell::EMPTY);
    for col in 0..10 {
        grid.set(Cell::new(col, 19), GridCell::filled(Color::RED));
    }
    grid.set(Cell::new(4, 18), marker);

    grid.collapse_row(19, GridCell::EMPTY);

    assert_eq!(grid.get(Cell::new(4, 19)), Some(&marker));
    assert_eq!(grid.row(19).iter().filter(|c| !c.is_empty()).count(), 1);
    assert!(grid.row(0).iter().all(|c| c.is_empty()));
}

#[test]
fn mover_needs_eight_reference_steps_per_cell() {
    let mut mover = GridMover::new(Cell::new(2, 2), Direction::Right, 0.125);
    for _ in 0..7 {
        assert!(!mover.advance(1.0));
    }
    assert!(mover.advance(1.0));
    assert_eq!(mover.cell, Cell::new(3, 2));
    assert!(mover.at_center());
    assert_eq!(mover.position(), Vec2::new(3.0, 2.0));
}

#[test]
fn pacman_cannot_enter_a_wall() {
    let layout = MazeLayout::parse(
        &["#######", "#     #", "#     #", "#     #", "#     #", "##### #", "#######"],
        Cell::new(5, 5),
        &[],
    );
    let hooks = Hooks {
        store: Box::new(MemoryScoreStore::new()),
        display: Box::new(MemoryDisplay::new()),
    };
    let mut game = PacMan::with_maze(hooks, &Settings::default(), Pcg32::seed_from_u64(3), layout);
    game.start();
    assert_eq!(game.phase(), GamePhase::Playing);

    let mut input = InputState::new();
    input.key_down(Key::ArrowLeft);
    for _ in 0..10 {
        game.update(1000.0 / 60.0, &input).unwrap();
        input.end_frame();
    }
    assert_eq!(game.pacman().cell, Cell::new(5, 5));
    assert_eq!(game.score().unwrap().score, 0);
}

#[test]
fn high_score_published_on_construction() {
    let display = MemoryDisplay::new();
    let board = Scoreboard::new(
        "loadedHighScore",
        Box::new(MemoryScoreStore::with("loadedHighScore", 75)),
        Box::new(display.clone()),
        3,
    );
    assert_eq!(board.high_score(), 75);
    assert_eq!(display.get(HudField::HighScore), Some(75));
    assert_eq!(display.get(HudField::Lives), Some(3));
    assert_eq!(display.get(HudField::Level), Some(1));
}
