//! niftyscan TUI: live CALL/PUT signal dashboard.
//!
//! Tabs:
//! 1. CALL SIDE: active call entries, narrowest bands first
//! 2. PUT SIDE: active put entries, narrowest bands first
//!
//! Screening cycles run on a background worker; press `r` to refresh, or pass
//! `--refresh-secs` to refresh on a timer.

mod app;
mod input;
mod theme;
mod ui;
mod worker;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use niftyscan_runner::{init_file_logging, Screener, ScreenerConfig};

use crate::app::AppState;
use crate::worker::WorkerCommand;

#[derive(Parser)]
#[command(name = "niftyscan-tui", about = "Live intraday CALL/PUT signal dashboard")]
struct Args {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Instrument list (CSV with a `Stock` column). Overrides the config.
    #[arg(long)]
    stocks: Option<PathBuf>,

    /// Read bars from `{dir}/{symbol}.csv` instead of Yahoo Finance.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Refresh automatically every N seconds.
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// Fetch instruments in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Write the log file as JSON lines.
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("niftyscan")
        .join("tui.log");
    init_file_logging(&log_path, args.log_json)?;

    let screener = build_screener(&args).map_err(|e| {
        let message = format!("{e:#}");
        tracing::error!(error = %message, "screener setup failed");
        message
    });

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle =
        worker::spawn_worker(screener, cmd_rx, resp_tx).context("spawning worker thread")?;

    let refresh_every = args.refresh_secs.map(Duration::from_secs);
    let mut app = AppState::new(cmd_tx.clone(), resp_rx, refresh_every);
    tracing::info!(log = %log_path.display(), ?refresh_every, "tui started");

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Load the config and apply command-line overrides.
fn build_screener(args: &Args) -> Result<Screener> {
    let mut config = match &args.config {
        Some(path) => ScreenerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ScreenerConfig::default(),
    };
    if let Some(stocks) = &args.stocks {
        config.universe.path = stocks.clone();
    }
    if args.data_dir.is_some() {
        config.fetch.data_dir = args.data_dir.clone();
    }
    config.fetch.parallel |= args.parallel;
    Ok(Screener::from_config(config)?)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        let now = Instant::now();
        if app.refresh_due(now) {
            app.request_refresh(now);
        }

        terminal.draw(|f| ui::draw(f, app))?;

        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_response(resp);
        }

        // 50ms poll gives a ~20 FPS tick.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}
