/// Entry point and event loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use env_logger::{Builder, Env, Target};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use config::GameConfig;
use domain::dictionary::Dictionary;
use error::TermlinkError;
use sim::terminal::TerminalState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() -> ExitCode {
    let config = GameConfig::load();
    init_logging(&config);

    let mut term = match setup(&config) {
        Ok(t) => t,
        Err(e) => {
            error!("setup failed: {e}");
            eprintln!("termlink: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let result = game_loop(&mut term, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(()) => {
            info!("terminal closed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("terminal stopped: {e}");
            eprintln!("termlink: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Load the word list and check the configured bucket before the
/// terminal switches to raw mode.
fn setup(config: &GameConfig) -> Result<TerminalState, TermlinkError> {
    let dictionary = Dictionary::from_config(config.dictionary.as_deref())?;
    let words = dictionary.bucket(config.puzzle.word_length)?.len();
    info!("dictionary ready: {words} words of length {}", config.puzzle.word_length);
    TerminalState::new(config.clone(), dictionary, StdRng::from_entropy())
}

/// File target when `log_file` is set (default filter `info`); otherwise
/// stderr, silent unless RUST_LOG asks for output.
fn init_logging(config: &GameConfig) {
    let file = config.log_file.as_ref().and_then(|path| match File::create(path) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("termlink: cannot open log file {}: {e}", path.display());
            None
        }
    });

    let mut builder = match file {
        Some(f) => {
            let mut b = Builder::from_env(Env::default().default_filter_or("info"));
            b.target(Target::Pipe(Box::new(f)));
            b
        }
        None => Builder::from_env(Env::default().default_filter_or("off")),
    };
    builder.try_init().unwrap_or(());
}

fn game_loop(
    term: &mut TerminalState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), TermlinkError> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad connected");
    }
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.esc_pressed() {
            break;
        }

        let now = Instant::now();
        let layout = renderer.layout();
        for cmd in kb.commands(layout.as_ref()).into_iter().chain(gp.commands()) {
            term.apply(cmd, now)?;
        }

        if last_tick.elapsed() >= tick_rate {
            term.tick(now)?;
            last_tick = Instant::now();
        }

        renderer.render(term)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
