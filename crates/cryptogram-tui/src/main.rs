mod animations;
mod app;
mod config;
mod game;
mod keypanel;
mod practice;
mod render;
mod storage;
mod theme;
mod worksheet;

use app::App;
use clap::Parser;
use config::{Config, Environment, DEFAULT_LOG_FILTER};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use cryptogram_core::CipherMode;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use theme::Theme;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build, save, print and solve Spanish substitution cryptograms
#[derive(Parser, Debug)]
#[command(name = "cryptogram", version)]
struct Cli {
    /// Cipher mode (letters, greek, cyrillic, symbols, symbols-hard,
    /// coordinates, coordinates-rows)
    #[arg(short, long)]
    mode: Option<CipherMode>,

    /// Message to encode instead of the sample text
    #[arg(short, long)]
    text: Option<String>,

    /// Seed for reproducible keys
    #[arg(long)]
    seed: Option<u64>,

    /// Mark accented letters while solving
    #[arg(long)]
    tildes: bool,

    /// Directory for the library, notice marker and log file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Start solving right away
    #[arg(short, long)]
    play: bool,

    /// Color theme
    #[arg(long, default_value = "dark", value_parser = ["dark", "light", "contrast"])]
    theme: String,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Err(e) = init_logging(&config) {
        eprintln!("Logging disabled: {}", e);
    }
    tracing::info!(env = ?config.env, data_dir = %config.data_dir.display(), "starting");

    let mut app = App::from_config(&config, cli.seed);
    apply_cli(&mut app, &cli);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = run_app(&mut stdout, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    if let Err(e) = result {
        tracing::error!(error = %e, "terminal loop failed");
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn apply_cli(app: &mut App, cli: &Cli) {
    if let Some(theme) = Theme::by_name(&cli.theme) {
        app.theme = theme;
    }
    if let Some(mode) = cli.mode {
        app.set_mode(mode);
    }
    if let Some(ref text) = cli.text {
        app.text = text.clone();
    }
    app.tilde_assistant = cli.tildes;
    if cli.play {
        app.play();
    }
}

/// Log to a file in the data directory; the terminal belongs to the UI.
/// The test environment keeps everything off disk and logs nothing.
fn init_logging(config: &Config) -> io::Result<()> {
    if config.env == Environment::Test {
        return Ok(());
    }
    fs::create_dir_all(&config.data_dir)?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;

    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

fn run_app(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let tick_rate = app.get_tick_rate();

        render::render(stdout, app)?;
        stdout.flush()?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(33)))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    app::AppAction::Continue => {}
                    app::AppAction::Quit => break,
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
