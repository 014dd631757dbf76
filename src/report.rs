//! Line-oriented rendering of cycle results.
//!
//! Rows are tab-separated: timestamp, pid, read rate, write rate,
//! executable path. Fancy mode adds a header, K/M/G suffixes, and note
//! lines for processes that lived through only one pass.

use std::io::{self, Write};

use chrono::Local;

use crate::collector::traits::FileSystem;
use crate::engine::{CycleReport, SampleIo};
use crate::fmt::format_rate_col;

/// Output switches for the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Print every measured process, even those with zero I/O.
    pub show_all: bool,
    /// Human-readable mode: header, rate suffixes, and notes for
    /// short-lived or vanished processes.
    pub fancy: bool,
}

/// Renders cycle reports as text rows.
pub struct Reporter<'a, F: FileSystem> {
    fs: &'a F,
    proc_path: &'a str,
    opts: ReportOptions,
}

impl<'a, F: FileSystem> Reporter<'a, F> {
    /// Creates a reporter resolving executable paths under `proc_path`.
    pub fn new(fs: &'a F, proc_path: &'a str, opts: ReportOptions) -> Self {
        Self {
            fs,
            proc_path,
            opts,
        }
    }

    /// Prints one cycle's report, stamped with the current local time.
    pub fn print_cycle<W: Write>(
        &self,
        out: &mut W,
        report: &CycleReport,
        interval_secs: u64,
    ) -> io::Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.render(out, report, interval_secs, &timestamp)
    }

    /// Renders one cycle's report with the given timestamp.
    ///
    /// Rates are the interval deltas divided by the interval length,
    /// truncated toward zero, sign preserved.
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        report: &CycleReport,
        interval_secs: u64,
        timestamp: &str,
    ) -> io::Result<()> {
        if self.opts.fancy {
            writeln!(
                out,
                "timestamp\t\tpid\t      read\t     write\texecutable"
            )?;
        }

        let secs = interval_secs.max(1) as i64;
        for sample in &report.samples {
            match sample.io {
                SampleIo::Measured {
                    read_bytes,
                    write_bytes,
                } => {
                    if read_bytes == 0 && write_bytes == 0 && !self.opts.show_all {
                        continue;
                    }
                    writeln!(
                        out,
                        "{}\t{}\t{}\t{}\t{}",
                        timestamp,
                        sample.pid,
                        format_rate_col(read_bytes / secs, self.opts.fancy),
                        format_rate_col(write_bytes / secs, self.opts.fancy),
                        self.exe_display(sample.pid)
                    )?;
                }
                SampleIo::ShortLived { .. } => {
                    if self.opts.fancy {
                        writeln!(
                            out,
                            "{}\t{}\tdid not live long enough",
                            timestamp, sample.pid
                        )?;
                    }
                }
            }
        }

        if self.opts.fancy {
            for pid in &report.vanished {
                writeln!(out, "{}\t{}\tdid not live long enough", timestamp, pid)?;
            }
        }

        Ok(())
    }

    fn exe_display(&self, pid: u32) -> String {
        let link = format!("{}/{}/exe", self.proc_path, pid);
        self.fs
            .read_link(std::path::Path::new(&link))
            .map(|target| target.display().to_string())
            .unwrap_or_else(|_| "-".to_string())
    }
}
