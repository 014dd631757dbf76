//! Parsers for Linux `/proc` filesystem files.

pub mod parser;

pub use parser::{IoCounters, parse_io_counters};
