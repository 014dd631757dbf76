//! Parser for `/proc/[pid]/io`.
//!
//! A pure function over file content, designed to be testable with string
//! inputs.

/// Cumulative storage I/O counters for one process, from `/proc/[pid]/io`.
///
/// Only `read_bytes` and `write_bytes` matter here: the byte counts that
/// actually hit the storage layer. The char/syscall counters the kernel
/// reports alongside them are ignored, and `cancelled_write_bytes` is not
/// subtracted so write totals stay comparable with other accounting tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Parses `/proc/[pid]/io` content.
///
/// Format is `key: value` pairs, one per line. Unknown keys are ignored and
/// malformed values read as zero.
pub fn parse_io_counters(content: &str) -> IoCounters {
    let mut io = IoCounters::default();

    for line in content.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let value: u64 = value.trim().parse().unwrap_or(0);
            match key.trim() {
                "read_bytes" => io.read_bytes = value,
                "write_bytes" => io.write_bytes = value,
                _ => {}
            }
        }
    }

    io
}
