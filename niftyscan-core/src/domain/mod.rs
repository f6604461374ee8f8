//! Domain types for niftyscan

pub mod bar;
pub mod indicator_set;
pub mod signal_row;

pub use bar::Bar;
pub use indicator_set::{finite, EnrichedBar, IndicatorSet};
pub use signal_row::{Side, SignalFlags, SignalRow};
