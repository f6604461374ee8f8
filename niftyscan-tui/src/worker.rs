//! Background worker thread: screening cycles run here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. The worker
//! owns the screener, so the fetch cache lives on this thread only. When the
//! screener could not be built, every refresh answers with the setup error so
//! the UI stays up and shows it.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use niftyscan_runner::{CycleProgress, CycleReport, FetchOutcome, Screener};

/// Commands sent from the TUI to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCommand {
    /// Clear the cache, reload the instrument list and run a cycle.
    Refresh,
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    FetchProgress {
        symbol: String,
        total: usize,
    },
    FetchSymbolDone {
        symbol: String,
        /// `None` when the instrument was dropped.
        bars: Option<usize>,
        reason: Option<String>,
    },
    CycleDone {
        report: Box<CycleReport>,
    },
    CycleFailed {
        error: String,
    },
}

/// Spawn the background worker thread. `screener` carries the setup error
/// message when configuration failed.
pub fn spawn_worker(
    screener: Result<Screener, String>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("niftyscan-worker".into())
        .spawn(move || worker_loop(screener, rx, tx))
}

fn worker_loop(screener: Result<Screener, String>, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Refresh) => {
                // Collapse refreshes that queued up while a cycle was running.
                let mut shutdown = false;
                while let Ok(cmd) = rx.try_recv() {
                    if cmd == WorkerCommand::Shutdown {
                        shutdown = true;
                    }
                }
                if shutdown {
                    break;
                }
                match &screener {
                    Ok(screener) => handle_refresh(screener, &tx),
                    Err(error) => {
                        let _ = tx.send(WorkerResponse::CycleFailed {
                            error: error.clone(),
                        });
                    }
                }
            }
        }
    }
    tracing::debug!("worker stopped");
}

fn handle_refresh(screener: &Screener, tx: &Sender<WorkerResponse>) {
    let progress = ChannelProgress { tx: tx.clone() };
    let response = match screener.refresh_with(&progress) {
        Ok(report) => WorkerResponse::CycleDone {
            report: Box::new(report),
        },
        Err(e) => {
            tracing::error!(error = %e, "screening cycle failed");
            WorkerResponse::CycleFailed {
                error: e.to_string(),
            }
        }
    };
    let _ = tx.send(response);
}

struct ChannelProgress {
    tx: Sender<WorkerResponse>,
}

impl CycleProgress for ChannelProgress {
    fn on_start(&self, symbol: &str, _index: usize, total: usize) {
        let _ = self.tx.send(WorkerResponse::FetchProgress {
            symbol: symbol.to_string(),
            total,
        });
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, outcome: &FetchOutcome) {
        let (bars, reason) = match outcome {
            FetchOutcome::Series(bars) => (Some(bars.len()), None),
            FetchOutcome::NoData(reason) => (None, Some(reason.clone())),
        };
        let _ = self.tx.send(WorkerResponse::FetchSymbolDone {
            symbol: symbol.to_string(),
            bars,
            reason,
        });
    }

    fn on_cycle_complete(&self, _fetched: usize, _dropped: usize, _total: usize) {}
}
