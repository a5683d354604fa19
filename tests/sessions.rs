//! Whole sessions driven through the public API with in-memory host surfaces

use retro_arcade::platform::{HudField, MemoryDisplay, RecordingRenderer};
use retro_arcade::sim::{GamePhase, RunState};
use retro_arcade::{GameKind, Key, MemoryScoreStore, ScoreStore, Session, Settings};

const FRAME_MS: f64 = 1000.0 / 60.0;

struct Harness {
    session: Session,
    recorder: RecordingRenderer,
    display: MemoryDisplay,
    store: MemoryScoreStore,
    now: f64,
}

impl Harness {
    fn new(kind: GameKind, store: MemoryScoreStore) -> Self {
        let recorder = RecordingRenderer::new();
        let display = MemoryDisplay::new();
        let session = Session::builder(kind)
            .renderer(recorder.clone())
            .store(store.clone())
            .display(display.clone())
            .seed(2024)
            .build()
            .unwrap();
        Self {
            session,
            recorder,
            display,
            store,
            now: 0.0,
        }
    }

    fn frames(&mut self, n: u32) {
        for _ in 0..n {
            self.session.frame(self.now).unwrap();
            self.now += FRAME_MS;
        }
    }

    fn tap(&mut self, key: Key) {
        self.session.key_down(key);
        self.frames(1);
        self.session.key_up(key);
    }
}

#[test]
fn every_game_runs_headless() {
    for kind in GameKind::ALL {
        let mut h = Harness::new(kind, MemoryScoreStore::new());
        h.session.start();
        h.session.key_down(Key::Space);
        for (i, key) in [Key::ArrowLeft, Key::ArrowUp, Key::ArrowRight, Key::ArrowDown]
            .into_iter()
            .cycle()
            .take(12)
            .enumerate()
        {
            h.session.key_down(key);
            h.frames(30);
            h.session.key_up(key);
            assert!(h.recorder.frames() >= (i as u64 + 1) * 30, "{} stopped rendering", kind);
        }
        assert!(h.session.total_steps() > 0, "{} never stepped", kind);
        assert_ne!(h.session.phase(), GamePhase::Menu);
    }
}

#[test]
fn stored_high_score_is_shown_and_kept() {
    let store = MemoryScoreStore::with("snakeHighScore", 40);
    let h = Harness::new(GameKind::Snake, store);
    assert_eq!(h.session.score().unwrap().high_score, 40);
    assert_eq!(h.display.get(HudField::HighScore), Some(40));
    assert_eq!(h.store.get("snakeHighScore"), Some(40));
}

#[test]
fn pong_keeps_no_high_score() {
    let store = MemoryScoreStore::new();
    let mut h = Harness::new(GameKind::Pong, store.clone());
    h.session.start();
    h.frames(60 * 20);
    assert!(h.session.score().is_none());
    for kind in GameKind::ALL {
        if let Some(key) = kind.storage_key() {
            assert_eq!(store.get(key), None);
        }
    }
}

#[test]
fn snake_wall_ends_run_until_restart() {
    let mut h = Harness::new(GameKind::Snake, MemoryScoreStore::new());
    h.session.start();
    h.tap(Key::ArrowUp);
    // ten rows to the wall at 100 ms per move
    h.frames(60 * 3);
    assert_eq!(h.session.phase(), GamePhase::GameOver);
    assert!(h.recorder.texts().contains(&"GAME OVER".to_string()));

    let steps = h.session.total_steps();
    h.frames(30);
    assert_eq!(h.session.phase(), GamePhase::GameOver);
    assert!(h.session.total_steps() >= steps);

    h.tap(Key::Char('r'));
    assert_eq!(h.session.phase(), GamePhase::Playing);
}

#[test]
fn tetris_stacks_out_and_records_best() {
    let mut h = Harness::new(GameKind::Tetris, MemoryScoreStore::new());
    h.session.start();
    for _ in 0..400 {
        if h.session.phase() == GamePhase::GameOver {
            break;
        }
        h.tap(Key::Space);
    }
    assert_eq!(h.session.phase(), GamePhase::GameOver);
    let score = h.session.score().unwrap();
    assert!(score.high_score >= score.score);
    if score.score > 0 {
        assert_eq!(h.store.get("tetrisHighScore"), Some(score.high_score));
    }
}

#[test]
fn pause_freezes_play_but_keeps_drawing() {
    let mut h = Harness::new(GameKind::SpaceInvaders, MemoryScoreStore::new());
    h.session.start();
    h.frames(10);
    h.session.key_down(Key::Char('p'));
    h.session.key_up(Key::Char('p'));
    let drawn = h.recorder.frames();
    let before = h.recorder.commands();
    h.frames(120);
    assert_eq!(h.session.phase(), GamePhase::Paused);
    assert_eq!(h.recorder.frames(), drawn + 120);
    assert!(h.recorder.texts().contains(&"PAUSED".to_string()));
    // nothing moved: the frame differs only by the overlay
    let after = h.recorder.commands();
    assert_eq!(&after[..before.len()], &before[..]);
}

#[test]
fn suspend_and_stop() {
    let mut h = Harness::new(GameKind::Breakout, MemoryScoreStore::new());
    h.session.start();
    h.frames(5);
    h.session.suspend();
    assert_eq!(h.session.run_state(), RunState::Paused);
    let drawn = h.recorder.frames();
    h.frames(5);
    assert_eq!(h.recorder.frames(), drawn);

    h.session.resume();
    h.frames(1);
    assert_eq!(h.recorder.frames(), drawn + 1);

    h.session.dispose();
    assert_eq!(h.session.run_state(), RunState::Stopped);
    let report = h.session.frame(h.now).unwrap();
    assert!(!report.rearm);
}

#[test]
fn settings_json_drives_the_session() {
    let settings = Settings::from_json(r#"{"starting_lives": 5, "fixed_step_hz": 120}"#).unwrap();
    let mut session = Session::builder(GameKind::Breakout)
        .settings(settings)
        .renderer(RecordingRenderer::new())
        .store(MemoryScoreStore::new())
        .display(MemoryDisplay::new())
        .build()
        .unwrap();
    session.start();
    assert_eq!(session.score().unwrap().lives, 5);
    session.frame(0.0).unwrap();
    assert_eq!(session.frame(30.0).unwrap().steps, 3);
}
