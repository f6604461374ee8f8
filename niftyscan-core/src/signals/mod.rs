//! Signal composition and presentation views.
//!
//! Rules are evaluated row by row over `Option<f64>` indicator values; a
//! missing value never fires a signal. The composer owns the time-of-day
//! filter and entry-duration bookkeeping, and views are read-only projections
//! of the composed table.

pub mod composer;
pub mod rules;
pub mod view;

pub use composer::{compose, default_cutoff, ComposedTable};
pub use rules::{Bounds, EntryRule, SignalRules};
pub use view::{active_view, caption, SignalView, ViewRow, VIEW_COLUMNS};
