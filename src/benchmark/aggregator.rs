//! Fan-in of worker `Stats` records
//!
//! Workers push onto a bounded channel sized to hold every record of a run,
//! so a send never blocks. The aggregator drains it once all senders are gone.

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::time::Duration;

use hdrhistogram::Histogram;

use super::worker::{latency_histogram, Stats};

/// Create the fan-in channel for `capacity` records
pub fn stats_channel(capacity: usize) -> (SyncSender<Stats>, Receiver<Stats>) {
    mpsc::sync_channel(capacity.max(1))
}

/// Sums over every record received
#[derive(Debug, Clone)]
pub struct AggregatedStats {
    pub operations: u64,
    pub errors: u64,
    /// Number of Stats records consumed
    pub records: u64,
    /// Longest single worker duration
    pub max_worker_duration: Duration,
    pub histogram: Histogram<u64>,
}

impl Default for AggregatedStats {
    fn default() -> Self {
        Self {
            operations: 0,
            errors: 0,
            records: 0,
            max_worker_duration: Duration::ZERO,
            histogram: latency_histogram(),
        }
    }
}

impl AggregatedStats {
    pub fn add(&mut self, stats: &Stats) {
        self.operations += stats.operations;
        self.errors += stats.errors;
        self.records += 1;
        self.max_worker_duration = self.max_worker_duration.max(stats.duration);
        self.histogram.add(&stats.histogram).ok();
    }

    /// Latency at percentile `p`, in milliseconds
    pub fn percentile_ms(&self, p: f64) -> f64 {
        self.histogram.value_at_percentile(p) as f64 / 1000.0
    }

    pub fn max_latency_ms(&self) -> f64 {
        self.histogram.max() as f64 / 1000.0
    }
}

/// Consume `receiver` until it is closed and drained
pub fn aggregate(receiver: Receiver<Stats>) -> AggregatedStats {
    let mut totals = AggregatedStats::default();
    for stats in receiver {
        totals.add(&stats);
    }
    totals
}
