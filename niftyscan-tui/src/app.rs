//! Application state: active tab, latest cycle report, fetch progress, errors.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};

use niftyscan_core::domain::Side;
use niftyscan_core::signals::SignalView;
use niftyscan_runner::CycleReport;

use crate::worker::{WorkerCommand, WorkerResponse};

const MAX_ERRORS: usize = 50;

/// The two signal tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Call,
    Put,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Call, Tab::Put];

    pub fn index(self) -> usize {
        match self {
            Tab::Call => 0,
            Tab::Put => 1,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn side(self) -> Side {
        match self {
            Tab::Call => Side::Call,
            Tab::Put => Side::Put,
        }
    }

    pub fn label(self) -> &'static str {
        self.side().label()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// An instrument yielded no data and was dropped.
    Dropped,
    /// The whole cycle failed.
    Cycle,
    /// Could not talk to the worker thread.
    Worker,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Dropped => "dropped",
            ErrorCategory::Cycle => "cycle",
            ErrorCategory::Worker => "worker",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
    pub at: NaiveDateTime,
}

/// Progress of the cycle currently running on the worker.
#[derive(Debug, Clone, Default)]
pub struct FetchState {
    pub in_progress: bool,
    pub current_symbol: Option<String>,
    pub done: usize,
    pub total: usize,
}

pub struct AppState {
    pub running: bool,
    pub active_tab: Tab,
    pub show_errors: bool,

    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    pub report: Option<CycleReport>,
    pub views: Option<[SignalView; 2]>,
    pub scroll: [usize; 2],
    pub fetch: FetchState,

    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,

    /// Auto-refresh interval; `None` refreshes on demand only.
    pub refresh_every: Option<Duration>,
    pub last_refresh: Option<Instant>,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        refresh_every: Option<Duration>,
    ) -> Self {
        Self {
            running: true,
            active_tab: Tab::Call,
            show_errors: false,
            worker_tx,
            worker_rx,
            report: None,
            views: None,
            scroll: [0; 2],
            fetch: FetchState::default(),
            status_message: None,
            error_history: VecDeque::new(),
            refresh_every,
            last_refresh: None,
        }
    }

    /// The view shown on the active tab, once a cycle has completed.
    pub fn current_view(&self) -> Option<&SignalView> {
        self.views
            .as_ref()
            .map(|views| &views[self.active_tab.index()])
    }

    pub fn current_scroll(&self) -> usize {
        self.scroll[self.active_tab.index()]
    }

    pub fn scroll_down(&mut self) {
        let len = self.current_view().map_or(0, SignalView::len);
        let offset = &mut self.scroll[self.active_tab.index()];
        if *offset + 1 < len {
            *offset += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        let offset = &mut self.scroll[self.active_tab.index()];
        *offset = offset.saturating_sub(1);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll[self.active_tab.index()] = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        let len = self.current_view().map_or(0, SignalView::len);
        self.scroll[self.active_tab.index()] = len.saturating_sub(1);
    }

    /// Ask the worker for a new cycle. Ignored while one is running.
    pub fn request_refresh(&mut self, now: Instant) {
        if self.fetch.in_progress {
            return;
        }
        self.last_refresh = Some(now);
        if self.worker_tx.send(WorkerCommand::Refresh).is_err() {
            self.push_error(
                ErrorCategory::Worker,
                "worker thread is gone".into(),
                "refresh".into(),
            );
            return;
        }
        self.fetch = FetchState {
            in_progress: true,
            ..FetchState::default()
        };
        self.set_status("Refreshing...".into());
    }

    pub fn refresh_due(&self, now: Instant) -> bool {
        match (self.refresh_every, self.last_refresh) {
            (_, None) => true,
            (Some(every), Some(last)) => !self.fetch.in_progress && now.duration_since(last) >= every,
            (None, Some(_)) => false,
        }
    }

    pub fn handle_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::FetchProgress { symbol, total } => {
                self.fetch.current_symbol = Some(symbol);
                self.fetch.total = total;
            }
            WorkerResponse::FetchSymbolDone {
                symbol,
                bars,
                reason,
            } => {
                match (bars, reason) {
                    (Some(bars), _) => tracing::debug!(symbol = %symbol, bars, "instrument loaded"),
                    (None, reason) => self.push_error(
                        ErrorCategory::Dropped,
                        reason.unwrap_or_else(|| "no data".into()),
                        symbol,
                    ),
                }
                self.fetch.done += 1;
            }
            WorkerResponse::CycleDone { report } => {
                self.fetch = FetchState::default();
                self.apply_report(*report);
            }
            WorkerResponse::CycleFailed { error } => {
                self.fetch = FetchState::default();
                self.push_error(ErrorCategory::Cycle, error, "refresh".into());
            }
        }
    }

    /// Install a finished cycle. Scroll offsets are clamped to the new views.
    pub fn apply_report(&mut self, report: CycleReport) {
        let views = report.views();
        for (offset, view) in self.scroll.iter_mut().zip(&views) {
            *offset = (*offset).min(view.len().saturating_sub(1));
        }

        let message = format!(
            "{} CALL, {} PUT | {} of {} instruments",
            views[0].len(),
            views[1].len(),
            report.fetched(),
            report.attempted
        );
        if report.dropped.is_empty() {
            self.set_status(message);
        } else {
            self.set_warning(format!("{message} | {} dropped", report.dropped.len()));
        }

        self.views = Some(views);
        self.report = Some(report);
    }

    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        if self.error_history.len() >= MAX_ERRORS {
            self.error_history.pop_front();
        }
        self.status_message = Some((
            format!("[{}] {context}: {message}", category.label()),
            StatusLevel::Error,
        ));
        self.error_history.push_back(ErrorRecord {
            category,
            message,
            context,
            at: Local::now().naive_local(),
        });
    }

    pub fn set_status(&mut self, msg: String) {
        self.status_message = Some((msg, StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: String) {
        self.status_message = Some((msg, StatusLevel::Warning));
    }
}
