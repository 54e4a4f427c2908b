mod app;
mod dates;
mod model;
mod reminders;
mod schedule;
mod settings;
mod stats;
mod store;
mod timer;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use crate::app::App;
use crate::store::Store;

const TICK_RATE: Duration = Duration::from_millis(200);

#[derive(Parser)]
#[command(author, version, about = "🍅 tomatino - a terminal Pomodoro timer with tasks and stats")]
struct Args {
    /// Work session length in minutes
    #[arg(short, long)]
    work: Option<u32>,
    /// Short break length in minutes
    #[arg(short, long)]
    rest: Option<u32>,
    /// Long break length in minutes
    #[arg(short, long)]
    long_break: Option<u32>,
    /// Work sessions between long breaks
    #[arg(short, long)]
    sessions: Option<u32>,
    /// Pick up the timer where the last run left off
    #[arg(long)]
    resume: bool,
    /// Data directory override
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let store = match &args.data_dir {
        Some(dir) => Store::open(dir),
        None => Store::open_default(),
    }
    .context("could not open data directory")?;
    init_logging(store.dir())?;

    let mut settings = store.load_settings();
    // CLI overrides, re-sanitized so a bad flag falls back like a bad file.
    if let Some(w) = args.work {
        settings.work_duration = w;
    }
    if let Some(r) = args.rest {
        settings.short_break_duration = r;
    }
    if let Some(l) = args.long_break {
        settings.long_break_duration = l;
    }
    if let Some(s) = args.sessions {
        settings.sessions_until_long_break = s;
    }
    let settings = settings.sanitized();

    let mut app = App::new(store, settings, args.resume);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

/// Logs go to a file in the data directory; stdout belongs to the TUI.
fn init_logging(data_dir: &Path) -> Result<()> {
    let log_file = std::fs::File::create(data_dir.join("tomatino.log"))
        .context("could not open log file")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tomatino=info".parse()?),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if app.handle_key(key) {
                    app.save_on_quit();
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.update();
            last_tick = Instant::now();
        }
    }
}
