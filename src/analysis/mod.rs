//! Analysis modules.
//!
//! Aggregations over the record store: averages, extremes, leaderboard
//! and per-subject statistics.

pub mod aggregator;

pub use aggregator::*;
