//! Run summary: per-kind figures and the write/read roll-up
//!
//! Built once from the orchestrators' totals after every workload kind has
//! finished. Everything here is plain data so it serializes as-is.

use serde::Serialize;

use crate::benchmark::WorkloadTotals;
use crate::workload::WorkloadKind;

/// Operation and error counts of a group of workloads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationTotals {
    pub operations: u64,
    pub errors: u64,
}

impl OperationTotals {
    pub fn add(&mut self, operations: u64, errors: u64) {
        self.operations += operations;
        self.errors += errors;
    }

    /// Successful operations per one-minute cycle
    pub fn per_minute(&self, cycles: u32) -> u64 {
        self.operations / u64::from(cycles.max(1))
    }
}

/// Latency percentiles in milliseconds
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LatencySummary {
    pub p50_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

/// Figures for one workload kind
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadSummary {
    pub kind: WorkloadKind,
    pub name: &'static str,
    pub cycles: u32,
    pub workers: u32,
    pub per_worker_quota: u64,
    pub operations: u64,
    pub errors: u64,
    pub operations_per_minute: u64,
    pub elapsed_secs: f64,
    /// Longest single worker run; below the budget means workers hit quota
    pub slowest_worker_secs: f64,
    pub latency: LatencySummary,
}

impl From<&WorkloadTotals> for WorkloadSummary {
    fn from(totals: &WorkloadTotals) -> Self {
        Self {
            kind: totals.kind,
            name: totals.kind.as_str(),
            cycles: totals.cycle_count,
            workers: totals.worker_count,
            per_worker_quota: totals.per_worker_quota,
            operations: totals.operations(),
            errors: totals.errors(),
            operations_per_minute: totals.operations_per_minute(),
            elapsed_secs: totals.elapsed.as_secs_f64(),
            slowest_worker_secs: totals.stats.max_worker_duration.as_secs_f64(),
            latency: LatencySummary {
                p50_ms: totals.stats.percentile_ms(50.0),
                p99_ms: totals.stats.percentile_ms(99.0),
                max_ms: totals.stats.max_latency_ms(),
            },
        }
    }
}

/// Everything reported at the end of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub cycles: u32,
    pub elapsed_secs: f64,
    pub write: OperationTotals,
    pub write_per_minute: u64,
    pub read: OperationTotals,
    pub read_per_minute: u64,
    pub workloads: Vec<WorkloadSummary>,
}

impl RunSummary {
    pub fn new(
        cycles: u32,
        elapsed_secs: f64,
        write: OperationTotals,
        read: OperationTotals,
        workloads: Vec<WorkloadSummary>,
    ) -> Self {
        Self {
            cycles,
            elapsed_secs,
            write,
            write_per_minute: write.per_minute(cycles),
            read,
            read_per_minute: read.per_minute(cycles),
            workloads,
        }
    }

    pub fn workload(&self, kind: WorkloadKind) -> Option<&WorkloadSummary> {
        self.workloads.iter().find(|w| w.kind == kind)
    }

    pub fn total_errors(&self) -> u64 {
        self.write.errors + self.read.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::worker::latency_histogram;
    use crate::benchmark::{AggregatedStats, Stats};
    use std::time::Duration;

    #[test]
    fn test_per_minute_divides_by_cycles() {
        let totals = OperationTotals {
            operations: 3_000_001,
            errors: 4,
        };
        assert_eq!(totals.per_minute(3), 1_000_000);
        assert_eq!(totals.per_minute(0), 3_000_001);
    }

    #[test]
    fn test_summary_rollup() {
        let mut read = OperationTotals::default();
        read.add(100, 1);
        read.add(50, 2);
        let write = OperationTotals {
            operations: 80,
            errors: 0,
        };

        let summary = RunSummary::new(2, 125.0, write, read, Vec::new());
        assert_eq!(summary.read, OperationTotals { operations: 150, errors: 3 });
        assert_eq!(summary.read_per_minute, 75);
        assert_eq!(summary.write_per_minute, 40);
        assert_eq!(summary.total_errors(), 3);
        assert!(summary.workload(WorkloadKind::Write).is_none());
    }

    #[test]
    fn test_workload_summary_from_totals() {
        let mut stats = AggregatedStats::default();
        for (ms, latency_us) in [(40, 1_000), (90, 3_000)] {
            let mut histogram = latency_histogram();
            histogram.record(latency_us).unwrap();
            stats.add(&Stats {
                worker_id: 0,
                cycle_id: 0,
                operations: 10,
                errors: 1,
                duration: Duration::from_millis(ms),
                histogram,
            });
        }
        let totals = WorkloadTotals {
            kind: WorkloadKind::PrefixRead,
            cycle_count: 2,
            worker_count: 1,
            per_worker_quota: 10,
            elapsed: Duration::from_millis(200),
            stats,
        };

        let summary = WorkloadSummary::from(&totals);
        assert_eq!(summary.name, "List GET in Geohash");
        assert_eq!(summary.operations, 20);
        assert_eq!(summary.errors, 2);
        assert_eq!(summary.operations_per_minute, 10);
        assert!((summary.slowest_worker_secs - 0.09).abs() < 1e-9);
        assert!(summary.latency.max_ms >= 3.0);
    }
}
