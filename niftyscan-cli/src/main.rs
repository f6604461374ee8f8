//! niftyscan CLI: one-shot screening and configuration helpers.
//!
//! Commands:
//! - `scan`: run one screening cycle and print the CALL and PUT views
//! - `universe`: print the instrument list as it will be screened
//! - `config`: print the default configuration, or validate a file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use niftyscan_core::data::Universe;
use niftyscan_core::domain::Side;
use niftyscan_core::signals::{SignalView, VIEW_COLUMNS};
use niftyscan_runner::{init_logging, CycleReport, LogProgress, Screener, ScreenerConfig};

#[derive(Parser)]
#[command(
    name = "niftyscan",
    about = "niftyscan CLI: intraday CALL/PUT signal screener for NIFTY stocks"
)]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one screening cycle and print the active signals.
    Scan {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Instrument list (CSV with a `Stock` column). Overrides the config.
        #[arg(long)]
        stocks: Option<PathBuf>,

        /// Read bars from `{dir}/{symbol}.csv` instead of Yahoo Finance.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Which view(s) to print.
        #[arg(long, value_enum, default_value_t = SideArg::Both)]
        side: SideArg,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Fetch instruments in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Print the instrument list that would be screened.
    Universe {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Instrument list (CSV with a `Stock` column). Overrides the config.
        #[arg(long)]
        stocks: Option<PathBuf>,
    },
    /// Print the default configuration, or validate a config file.
    Config {
        /// Validate this file instead of printing defaults.
        #[arg(long)]
        check: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SideArg {
    Call,
    Put,
    Both,
}

impl SideArg {
    fn includes(self, side: Side) -> bool {
        match self {
            SideArg::Both => true,
            SideArg::Call => side == Side::Call,
            SideArg::Put => side == Side::Put,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;

    match cli.command {
        Commands::Scan {
            config,
            stocks,
            data_dir,
            side,
            format,
            parallel,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(stocks) = stocks {
                config.universe.path = stocks;
            }
            if data_dir.is_some() {
                config.fetch.data_dir = data_dir;
            }
            config.fetch.parallel |= parallel;
            run_scan(config, side, format)
        }
        Commands::Universe { config, stocks } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(stocks) = stocks {
                config.universe.path = stocks;
            }
            run_universe(&config)
        }
        Commands::Config { check } => run_config(check.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<ScreenerConfig> {
    match path {
        Some(path) => ScreenerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ScreenerConfig::default()),
    }
}

fn run_scan(config: ScreenerConfig, side: SideArg, format: OutputFormat) -> Result<()> {
    let screener = Screener::from_config(config)?;
    let report = screener.refresh_with(&LogProgress)?;

    let views: Vec<SignalView> = report
        .views()
        .into_iter()
        .filter(|view| side.includes(view.side))
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&views)?),
        OutputFormat::Table => {
            for view in &views {
                print_view(view);
                println!();
            }
            print_footer(&report);
        }
    }
    Ok(())
}

fn run_universe(config: &ScreenerConfig) -> Result<()> {
    let universe = Universe::from_file(&config.universe.path, &config.universe.column)?;
    println!("{} instruments from {}", universe.len(), config.universe.path.display());
    for (i, symbol) in universe.symbols().iter().enumerate() {
        println!("{:>4}  {symbol}", i + 1);
    }
    Ok(())
}

fn run_config(check: Option<&Path>) -> Result<()> {
    match check {
        Some(path) => {
            ScreenerConfig::from_file(path)?;
            println!("{}: ok", path.display());
        }
        None => print!("{}", ScreenerConfig::default().to_toml()?),
    }
    Ok(())
}

const WIDTHS: [usize; 12] = [14, 7, 7, 7, 8, 7, 7, 7, 7, 7, 17, 12];

fn print_view(view: &SignalView) {
    println!("=== {} ===", view.title);
    if view.is_empty() {
        println!("(no active signals)");
        return;
    }

    let header: Vec<String> = VIEW_COLUMNS
        .iter()
        .zip(WIDTHS)
        .map(|(name, w)| format!("{name:<w$}"))
        .collect();
    println!("{}", header.join(" "));
    println!("{}", "-".repeat(WIDTHS.iter().sum::<usize>() + WIDTHS.len() - 1));

    for row in &view.rows {
        let cells: Vec<String> = row
            .cells()
            .iter()
            .zip(WIDTHS)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        println!("{}", cells.join(" "));
    }
}

fn print_footer(report: &CycleReport) {
    let [call, _] = report.views();
    println!("{}", call.caption);
    println!(
        "{} instruments, {} rows, {} dropped, {:.1}s",
        report.fetched(),
        report.table.len(),
        report.dropped.len(),
        report.elapsed.as_secs_f64()
    );
    for dropped in &report.dropped {
        println!("  dropped {}: {}", dropped.symbol, dropped.reason);
    }
}
