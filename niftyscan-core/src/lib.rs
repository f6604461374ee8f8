//! niftyscan core: bars, market data providers, indicators, signal composition.
//!
//! This crate contains everything a screening cycle needs except orchestration:
//! - Domain types (bars, indicator snapshots, signal rows)
//! - Data providers (Yahoo chart API, offline CSV import) and column normalization
//! - Instrument universe loading
//! - The fixed indicator set with NaN warmup semantics
//! - Entry/exit rules, the composer and the two side views

pub mod data;
pub mod domain;
pub mod indicators;
pub mod signals;
