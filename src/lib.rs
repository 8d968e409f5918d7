//! issue-compare - side-by-side comparison of issue tracker projects.
//!
//! Fetches per-project analytics for 2 to 3 projects from a REST backend,
//! aligns them on a shared category axis and renders chart-ready datasets.

pub mod analysis;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod models;
pub mod report;
pub mod session;
