//! Logging initialization.
//!
//! Filter from `RUST_LOG`, falling back to `info`. Human-readable output by
//! default, JSON lines when asked for.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr so stdout stays clean for tables and JSON.
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter());
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

/// Append logs to `path`, creating parent directories. Used by the terminal
/// UI, where writing to stderr would corrupt the screen.
pub fn init_file_logging(path: &Path, json: bool) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let writer = Mutex::new(file);

    let registry = tracing_subscriber::registry().with(env_filter());
    if json {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .try_init()?;
    }
    Ok(())
}
