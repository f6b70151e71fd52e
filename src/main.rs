mod ui;

use std::fs::{self, OpenOptions};
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::info;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use vibe_machine::app::App;
use vibe_machine::config::Config;
use vibe_machine::engine::Engine;
use vibe_machine::scheduler::{Event, Schedule, Timers};
use vibe_machine::store::{FileStore, Persistence};

use crate::ui::draw;

/// Mine. Stake. Rug. Repeat.
#[derive(Parser, Debug)]
#[command(name = "vibe-machine", version)]
struct Cli {
    /// Directory holding the save file and log.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log destination (defaults to a file inside the data dir).
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the share text for the saved game and exit.
    #[arg(long)]
    share: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let log_path = cli.log_file.unwrap_or_else(|| config.log_path());
    init_logging(&log_path)?;

    let store = FileStore::new(config.data_dir.clone());
    let persistence = Persistence::new(store, config.save_key.clone());
    let engine = Engine::start(persistence);

    if cli.share {
        println!("{}", engine.share_text());
        return Ok(());
    }

    let mut app = App::new(engine);
    let mut terminal = setup_terminal()?;
    let res = run_app(&mut terminal, &mut app, Schedule::from_config(&config));
    let restored = restore_terminal(&mut terminal);
    flush_then(restored, || {
        app.shutdown();
    })?;
    res
}

/// Runs the final flush whether or not the terminal came back cleanly.
fn flush_then(restored: Result<()>, flush: impl FnOnce()) -> Result<()> {
    flush();
    restored
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<FileStore>,
    schedule: Schedule,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let timers = Timers::spawn(&tx, schedule);

    thread::spawn(move || {
        loop {
            if !event::poll(Duration::from_millis(250)).unwrap_or(false) {
                continue;
            }
            match event::read() {
                Ok(CEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx.send(Event::Input(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => {}
            }
        }
    });

    info!("Game loop started");
    loop {
        terminal.draw(|f| draw(f, app))?;

        match rx.recv()? {
            Event::Input(key) => app.on_key(key),
            Event::EconomyTick => app.on_economy_tick(),
            Event::ComboDecay => app.on_combo_decay(),
            Event::Flush => app.on_flush(),
        }

        if app.should_quit {
            break;
        }
    }

    timers.shutdown();
    Ok(())
}
