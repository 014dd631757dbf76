//! Two-pass sampling engine for per-process disk I/O.
//!
//! One cycle reads every live process's cumulative `read_bytes` /
//! `write_bytes` counters twice, separated by a fixed wait, and classifies
//! each pid by what the two passes saw:
//! - read in both passes: a measured sample carrying the counter deltas;
//! - read only in the final pass: a short-lived sample with absolute
//!   counters and no delta;
//! - read only in the baseline pass: a vanished pid, reported separately so
//!   stale absolute counters never surface as a rate.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::collector::procfs::parser::{IoCounters, parse_io_counters};
use crate::collector::traits::FileSystem;
use crate::registry::{Registry, Sample};

/// Error type for cycle failures.
///
/// Per-pid read failures are not errors: transient processes are expected
/// to disappear between enumeration and read, so those pids are skipped.
/// Only a failure to list the process table at all aborts the cycle.
#[derive(Debug)]
pub enum CycleError {
    /// The process table itself could not be listed.
    Enumerate { path: String, source: io::Error },
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleError::Enumerate { path, source } => {
                write!(f, "cannot enumerate processes under {}: {}", path, source)
            }
        }
    }
}

impl std::error::Error for CycleError {}

/// Configuration for sampling cycles.
///
/// Built once at startup and passed by reference into
/// [`SamplingEngine::run_cycle`].
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// Wait between the baseline and final pass.
    pub interval: Duration,
    /// When set, only processes owned by this uid are sampled.
    pub filter_uid: Option<u32>,
}

/// Per-process outcome of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleIo {
    /// Counter deltas across the interval. Negative when a counter went
    /// backwards (pid reused after a reset).
    Measured { read_bytes: i64, write_bytes: i64 },
    /// The process appeared after the baseline pass; only absolute
    /// counters exist, so no rate can be derived from them.
    ShortLived { read_abs: u64, write_abs: u64 },
}

/// One finalized per-process sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessIoSample {
    pub pid: u32,
    pub io: SampleIo,
}

impl ProcessIoSample {
    /// Whether this sample carries a valid interval delta.
    pub fn has_delta(&self) -> bool {
        matches!(self.io, SampleIo::Measured { .. })
    }
}

/// Everything one cycle produced.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Measured and short-lived samples, in ascending pid order.
    pub samples: Vec<ProcessIoSample>,
    /// Pids seen in the baseline pass that could not be read again,
    /// ascending.
    pub vanished: Vec<u32>,
}

/// Drives the two-pass sampling protocol over a [`FileSystem`].
pub struct SamplingEngine<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> SamplingEngine<F> {
    /// Creates an engine reading process data under `proc_path`.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to the proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// The filesystem handle.
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// The filesystem handle, mutable. Tests use this to change counters
    /// between the baseline and final pass.
    pub fn fs_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    /// Runs one full cycle: baseline pass, interval wait, final pass,
    /// classification. The registry lives and dies inside this call.
    pub fn run_cycle(&self, config: &CycleConfig) -> Result<CycleReport, CycleError> {
        let mut registry = Registry::new();

        self.baseline_pass(&mut registry, config)?;
        std::thread::sleep(config.interval);
        let seen_final = self.final_pass(&mut registry, config)?;

        let report = finalize(&registry, &seen_final);
        registry.remove_all();
        Ok(report)
    }

    /// Baseline pass: records absolute counters for every readable pid.
    pub fn baseline_pass(
        &self,
        registry: &mut Registry,
        config: &CycleConfig,
    ) -> Result<(), CycleError> {
        for pid in self.enumerate_pids()? {
            let Some(io) = self.sample_pid(pid, config) else {
                continue;
            };
            // The registry starts the cycle empty, so the pid cannot be
            // present yet; insert asserts that.
            registry.insert(
                pid,
                Sample::Baseline {
                    read_abs: io.read_bytes,
                    write_abs: io.write_bytes,
                },
            );
        }
        Ok(())
    }

    /// Final pass: rewrites baseline entries with interval deltas, records
    /// late arrivals, and returns the set of pids read successfully.
    pub fn final_pass(
        &self,
        registry: &mut Registry,
        config: &CycleConfig,
    ) -> Result<HashSet<u32>, CycleError> {
        let mut seen = HashSet::new();
        for pid in self.enumerate_pids()? {
            let Some(io) = self.sample_pid(pid, config) else {
                continue;
            };
            seen.insert(pid);
            match registry.find_mut(pid) {
                Some(sample) => {
                    let Sample::Baseline {
                        read_abs,
                        write_abs,
                    } = *sample
                    else {
                        debug_assert!(false, "pid {pid} promoted twice in one pass");
                        continue;
                    };
                    // Deltas stay signed and unclamped: a negative value
                    // means the pid was reused after a counter reset.
                    *sample = Sample::Delta {
                        read_bytes: io.read_bytes as i64 - read_abs as i64,
                        write_bytes: io.write_bytes as i64 - write_abs as i64,
                    };
                }
                None => {
                    registry.insert(
                        pid,
                        Sample::Baseline {
                            read_abs: io.read_bytes,
                            write_abs: io.write_bytes,
                        },
                    );
                }
            }
        }
        Ok(seen)
    }

    /// Lists currently live pids in ascending order.
    fn enumerate_pids(&self) -> Result<Vec<u32>, CycleError> {
        let entries = self
            .fs
            .read_dir(Path::new(&self.proc_path))
            .map_err(|source| CycleError::Enumerate {
                path: self.proc_path.clone(),
                source,
            })?;

        let mut pids: Vec<u32> = entries
            .iter()
            .filter_map(|entry| entry.file_name().and_then(|name| name.to_str()))
            .filter_map(|name| name.parse().ok())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    /// Reads one pid's counters, honoring the owner filter.
    ///
    /// Any failure is a silent skip (debug log only): the process is
    /// usually just gone, and retrying within the cycle would not help.
    fn sample_pid(&self, pid: u32, config: &CycleConfig) -> Option<IoCounters> {
        let io_path = PathBuf::from(format!("{}/{}/io", self.proc_path, pid));

        if let Some(uid) = config.filter_uid {
            match self.fs.owner_uid(&io_path) {
                Ok(owner) if owner == uid => {}
                Ok(_) => return None,
                Err(e) => {
                    debug!("skipping pid {pid}: cannot stat {}: {e}", io_path.display());
                    return None;
                }
            }
        }

        match self.fs.read_to_string(&io_path) {
            Ok(content) => Some(parse_io_counters(&content)),
            Err(e) => {
                debug!("skipping pid {pid}: {e}");
                None
            }
        }
    }
}

/// Splits the finished registry into finalized samples and vanished pids.
///
/// `seen_final` is the set of pids the final pass actually read: a baseline
/// entry in the set is a late arrival (short-lived sample), one outside it
/// is a vanished pid.
fn finalize(registry: &Registry, seen_final: &HashSet<u32>) -> CycleReport {
    let mut report = CycleReport::default();
    for (pid, sample) in registry.iter() {
        match *sample {
            Sample::Delta {
                read_bytes,
                write_bytes,
            } => report.samples.push(ProcessIoSample {
                pid,
                io: SampleIo::Measured {
                    read_bytes,
                    write_bytes,
                },
            }),
            Sample::Baseline {
                read_abs,
                write_abs,
            } => {
                if seen_final.contains(&pid) {
                    report.samples.push(ProcessIoSample {
                        pid,
                        io: SampleIo::ShortLived {
                            read_abs,
                            write_abs,
                        },
                    });
                } else {
                    report.vanished.push(pid);
                }
            }
        }
    }
    report
}
