//! Per-cycle registry of process I/O samples, ordered by pid.
//!
//! The registry lives for exactly one sampling cycle: the baseline pass
//! fills it with absolute counters, the final pass rewrites entries with
//! interval deltas, and the cycle drops it after reporting.

use std::collections::BTreeMap;

/// Counter snapshot for one tracked process within a cycle.
///
/// The two cases carry different units on purpose: `Baseline` holds
/// absolute cumulative counters read in a single pass, `Delta` holds signed
/// differences across the interval. Consumers match on the case instead of
/// trusting a side flag, so baseline absolutes can never be misread as a
/// rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    /// Absolute counters from one pass only.
    Baseline { read_abs: u64, write_abs: u64 },
    /// Bytes transferred during the interval. Negative when the counter
    /// went backwards (pid reused after a counter reset).
    Delta { read_bytes: i64, write_bytes: i64 },
}

/// Ordered collection of per-pid samples for one sampling cycle.
///
/// Iteration is ascending by pid. Pids stay unique as long as callers check
/// [`Registry::find`] before [`Registry::insert`].
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<u32, Sample>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the sample recorded for a pid.
    pub fn find(&self, pid: u32) -> Option<&Sample> {
        self.entries.get(&pid)
    }

    /// Mutable lookup, used by the final pass to rewrite entries in place.
    pub fn find_mut(&mut self, pid: u32) -> Option<&mut Sample> {
        self.entries.get_mut(&pid)
    }

    /// Inserts a sample for a pid.
    ///
    /// Does not deduplicate: callers look the pid up first. Inserting a pid
    /// that is already present overwrites the old sample and trips a debug
    /// assertion, since the sampling protocol never does this.
    pub fn insert(&mut self, pid: u32, sample: Sample) {
        let previous = self.entries.insert(pid, sample);
        debug_assert!(
            previous.is_none(),
            "duplicate registry insert for pid {pid}"
        );
    }

    /// Removes every entry. Safe to call when already empty.
    pub fn remove_all(&mut self) {
        self.entries.clear();
    }

    /// Iterates entries in ascending pid order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Sample)> {
        self.entries.iter().map(|(pid, sample)| (*pid, sample))
    }

    /// Number of tracked pids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no pid is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_returns_inserted_sample() {
        let mut registry = Registry::new();
        registry.insert(
            100,
            Sample::Baseline {
                read_abs: 1000,
                write_abs: 500,
            },
        );

        assert_eq!(
            registry.find(100),
            Some(&Sample::Baseline {
                read_abs: 1000,
                write_abs: 500
            })
        );
        assert_eq!(registry.find(101), None);
    }

    #[test]
    fn iteration_is_ascending_after_out_of_order_inserts() {
        let mut registry = Registry::new();
        for pid in [500, 2, 9999, 42, 1] {
            if registry.find(pid).is_none() {
                registry.insert(
                    pid,
                    Sample::Baseline {
                        read_abs: 0,
                        write_abs: 0,
                    },
                );
            }
        }

        let pids: Vec<u32> = registry.iter().map(|(pid, _)| pid).collect();
        assert_eq!(pids, vec![1, 2, 42, 500, 9999]);
    }

    #[test]
    fn find_before_insert_keeps_pids_unique() {
        let mut registry = Registry::new();
        for pid in [7, 3, 7, 3, 7] {
            if registry.find(pid).is_none() {
                registry.insert(
                    pid,
                    Sample::Baseline {
                        read_abs: 0,
                        write_abs: 0,
                    },
                );
            }
        }

        assert_eq!(registry.len(), 2);
        let matches = registry.iter().filter(|(pid, _)| *pid == 7).count();
        assert_eq!(matches, 1);
    }

    #[test]
    fn find_mut_rewrites_in_place() {
        let mut registry = Registry::new();
        registry.insert(
            10,
            Sample::Baseline {
                read_abs: 100,
                write_abs: 200,
            },
        );

        if let Some(sample) = registry.find_mut(10) {
            *sample = Sample::Delta {
                read_bytes: 50,
                write_bytes: -20,
            };
        }

        assert_eq!(
            registry.find(10),
            Some(&Sample::Delta {
                read_bytes: 50,
                write_bytes: -20
            })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_all_empties_the_registry() {
        let mut registry = Registry::new();
        registry.insert(
            1,
            Sample::Baseline {
                read_abs: 0,
                write_abs: 0,
            },
        );
        registry.insert(
            2,
            Sample::Baseline {
                read_abs: 0,
                write_abs: 0,
            },
        );

        registry.remove_all();
        assert!(registry.is_empty());
        assert_eq!(registry.find(1), None);
    }

    #[test]
    fn remove_all_on_empty_registry_is_a_noop() {
        let mut registry = Registry::new();
        registry.remove_all();
        registry.remove_all();
        assert!(registry.is_empty());
    }
}
