//! Comparison analysis modules.
//!
//! Aggregation of per-project payloads into aligned datasets, and the
//! palette used to color them.

pub mod aggregator;
pub mod palette;

pub use aggregator::*;
pub use palette::Palette;
