use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use anyhow::Context;
use crossterm::event::{self, Event};
use rand::thread_rng;

use space_shooter::assets::Assets;
use space_shooter::config::{GameConfig, LogConfig, CONFIG_FILE};
use space_shooter::display::{enter_terminal, leave_terminal, TerminalBackend};
use space_shooter::screens::{run_frame, Flow, Game};

// ── Logging ───────────────────────────────────────────────────────────────────

/// Route `log` records to a file; stdout and stderr belong to the game.
fn init_logging(cfg: &LogConfig) -> anyhow::Result<()> {
    let Some(path) = &cfg.file else {
        return Ok(());
    };
    let file =
        File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let env = env_logger::Env::default().default_filter_or(cfg.level.as_str());
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Dedicate a thread to blocking event reads so the game loop never blocks
/// on I/O.  The thread ends when the receiver is dropped.
fn spawn_reader() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });
    rx
}

// ── Game loop ─────────────────────────────────────────────────────────────────

fn run<W: Write>(out: W, rx: mpsc::Receiver<Event>, cfg: &GameConfig) -> anyhow::Result<()> {
    let (width, height) = (cfg.window.width, cfg.window.height);
    let mut backend = TerminalBackend::create_window(out, rx, width, height, &cfg.window.title)?;
    let assets = Assets::load(&mut backend, &cfg.assets, width, height)?;

    let mut rng = thread_rng();
    let clock = Instant::now();
    let mut game = Game::new(width, height);

    loop {
        let now = clock.elapsed().as_secs_f64();
        match run_frame(&game, &mut backend, &assets, cfg.target_fps, now, &mut rng)? {
            Flow::Continue(next) => game = next,
            Flow::Quit => break,
        }
    }
    log::info!("quit requested");
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let (mut cfg, cfg_error) = GameConfig::load_or_default(CONFIG_FILE);
    let warnings = cfg.validate();
    init_logging(&cfg.log)?;
    log::info!("Space Shooter starting");
    if let Some(e) = cfg_error {
        log::warn!("{CONFIG_FILE}: {e}; using defaults");
    }
    for w in warnings {
        log::warn!("{CONFIG_FILE}: {w}");
    }

    // The game and the restore share this writer
    let mut out = BufWriter::new(stdout());
    let mut keyboard_enhanced = false;
    let result = enter_terminal(&mut out).and_then(|enhanced| {
        keyboard_enhanced = enhanced;
        run(&mut out, spawn_reader(), &cfg)
    });
    leave_terminal(&mut out, keyboard_enhanced);

    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    result
}
