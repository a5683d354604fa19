//! Retro Arcade entry point
//!
//! On the web this mounts the game named by the canvas `data-game`
//! attribute. Natively it runs a short headless demo of each game.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("Retro Arcade starting...");

    match retro_arcade::platform::web::mount("gameCanvas") {
        Ok(_) => log::info!("Retro Arcade running!"),
        Err(e) => log::error!("Failed to start: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Retro Arcade (native) starting...");

    let mut args = std::env::args().skip(1);
    let kinds = match args.next() {
        Some(name) => match name.parse::<retro_arcade::GameKind>() {
            Ok(kind) => vec![kind],
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(2);
            }
        },
        None => retro_arcade::GameKind::ALL.to_vec(),
    };
    let seconds = args.next().and_then(|s| s.parse::<u32>().ok()).unwrap_or(10);

    let settings = retro_arcade::Settings::load();
    for kind in kinds {
        if let Err(e) = demo::run(kind, &settings, seconds) {
            log::error!("{} demo failed: {}", kind, e);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use retro_arcade::platform::{HudField, MemoryDisplay, RecordingRenderer};
    use retro_arcade::sim::GamePhase;
    use retro_arcade::{GameKind, Key, MemoryScoreStore, Result, Session, Settings};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const STEERING: [Key; 4] = [Key::ArrowLeft, Key::ArrowUp, Key::ArrowRight, Key::ArrowDown];

    /// Play `kind` headless for `seconds` of simulated time with a scripted
    /// player that holds Space and sweeps the arrow keys
    pub fn run(kind: GameKind, settings: &Settings, seconds: u32) -> Result<()> {
        let recorder = RecordingRenderer::new();
        let display = MemoryDisplay::new();
        let mut session = Session::builder(kind)
            .settings(settings.clone())
            .renderer(recorder.clone())
            .store(MemoryScoreStore::new())
            .display(display.clone())
            .build()?;

        session.start();
        session.key_down(Key::Space);
        let frames = (seconds as f64 * 1000.0 / FRAME_MS) as u64;
        let mut held = None;
        for frame in 0..frames {
            if frame % 45 == 0 {
                if let Some(key) = held.take() {
                    session.key_up(key);
                }
                let key = STEERING[(frame / 45) as usize % STEERING.len()];
                session.key_down(key);
                held = Some(key);
            }
            session.frame(frame as f64 * FRAME_MS)?;
            if session.phase() == GamePhase::GameOver {
                break;
            }
        }

        match session.score() {
            Some(score) => log::info!(
                "{}: {} after {} steps, score {} (best {}), level {}, {} frames drawn",
                kind,
                session.phase().label(),
                session.total_steps(),
                score.score,
                score.high_score,
                score.level,
                recorder.frames()
            ),
            None => log::info!(
                "{}: {} after {} steps, player {} computer {}, {} frames drawn",
                kind,
                session.phase().label(),
                session.total_steps(),
                display.get(HudField::PlayerScore).unwrap_or(0),
                display.get(HudField::ComputerScore).unwrap_or(0),
                recorder.frames()
            ),
        }
        session.dispose();
        Ok(())
    }
}
