//! piowatch — per-process disk I/O sampling.
//!
//! Provides:
//! - `collector` — filesystem abstraction and `/proc` parsing (real and mock)
//! - `registry` — ordered per-cycle registry of counter samples
//! - `engine` — the two-pass sampling cycle
//! - `report` — line-oriented report rendering
//! - `fmt` — rate formatting helpers

pub mod collector;
pub mod engine;
pub mod fmt;
pub mod registry;
pub mod report;
