//! Drives the four workload kinds concurrently
//!
//! Each kind gets its own orchestrator thread. Read kinds start after the
//! configured read delay. Write totals come straight from the write
//! orchestrator; the three read kinds add into one shared total under its
//! own lock.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use indicatif::MultiProgress;
use parking_lot::Mutex;
use tracing::info;

use super::id_sequencer::IdSequencer;
use super::orchestrator::{workload_progress_bar, WorkloadOrchestrator, WorkloadTotals};
use super::worker::WorkloadContext;
use crate::config::{RunConfig, WorkloadConfig};
use crate::metrics::{OperationTotals, RunSummary, WorkloadSummary};
use crate::utils::{LoadError, Result};
use crate::workload::{DriverStore, WorkloadKind};

/// Runs every workload kind of a `RunConfig` against one store
pub struct LoadRunner {
    store: Arc<dyn DriverStore>,
    config: RunConfig,
    write_ids: Arc<IdSequencer>,
    read_ids: Arc<IdSequencer>,
}

impl LoadRunner {
    pub fn new(store: Arc<dyn DriverStore>, config: RunConfig) -> Self {
        let write_ids = Arc::new(IdSequencer::new(config.write.keyspace_size));
        let read_ids = Arc::new(IdSequencer::new(config.single_read.keyspace_size));
        Self {
            store,
            config,
            write_ids,
            read_ids,
        }
    }

    fn context(&self, kind: WorkloadKind, index: u64) -> Arc<WorkloadContext> {
        // Separate generator streams per kind when seeded
        let seed = if self.config.seed == 0 {
            0
        } else {
            self.config.seed.wrapping_add(index << 48)
        };
        let ctx = WorkloadContext::new(Arc::clone(&self.store), self.config.search.clone(), seed);
        Arc::new(match kind {
            WorkloadKind::Write => ctx.with_ids(Arc::clone(&self.write_ids)),
            WorkloadKind::SingleRead => ctx.with_ids(Arc::clone(&self.read_ids)),
            WorkloadKind::RadiusRead | WorkloadKind::PrefixRead => ctx,
        })
    }

    fn orchestrator(
        &self,
        config: &WorkloadConfig,
        index: u64,
        progress: Option<&MultiProgress>,
    ) -> WorkloadOrchestrator {
        let orchestrator = WorkloadOrchestrator::new(self.context(config.kind, index));
        match progress {
            Some(multi) => {
                let pb = multi.add(workload_progress_bar(
                    config.kind,
                    config.expected_stats() as u64,
                ));
                orchestrator.with_progress(pb)
            }
            None => orchestrator,
        }
    }

    /// Run all four kinds and summarise them
    pub fn run(&self) -> Result<RunSummary> {
        let progress = (!self.config.quiet).then(MultiProgress::new);
        let read_totals = Mutex::new(OperationTotals::default());
        let start = Instant::now();

        info!(
            "Starting load: {} write workers, {} read workers per kind, {} cycle(s)",
            self.config.write.worker_count,
            self.config.single_read.worker_count,
            self.config.write.cycle_count
        );

        let results: Vec<Result<WorkloadTotals>> = thread::scope(|scope| {
            let handles: Vec<_> = self
                .config
                .workloads()
                .into_iter()
                .enumerate()
                .map(|(index, config)| {
                    let orchestrator = self.orchestrator(config, index as u64, progress.as_ref());
                    let read_totals = &read_totals;
                    let read_start_delay = self.config.read_start_delay;

                    scope.spawn(move || -> Result<WorkloadTotals> {
                        let is_read = !config.kind.is_write();
                        if is_read && !read_start_delay.is_zero() {
                            info!(
                                "{} waits {:?} before starting",
                                config.kind, read_start_delay
                            );
                            thread::sleep(read_start_delay);
                        }

                        let totals = orchestrator.run(config)?;
                        if is_read {
                            read_totals.lock().add(totals.operations(), totals.errors());
                        }
                        Ok(totals)
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        Err(LoadError::Worker("workload thread panicked".to_string()))
                    })
                })
                .collect()
        });

        let mut write = OperationTotals::default();
        let mut workloads = Vec::with_capacity(results.len());
        for result in results {
            let totals = result?;
            if totals.kind.is_write() {
                write.add(totals.operations(), totals.errors());
            }
            workloads.push(WorkloadSummary::from(&totals));
        }

        let read = *read_totals.lock();
        Ok(RunSummary::new(
            self.config.write.cycle_count,
            start.elapsed().as_secs_f64(),
            write,
            read,
            workloads,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::worker::testing::CountingStore;
    use crate::config::{CliArgs, QuotaPolicy};
    use clap::Parser;
    use std::time::Duration;

    fn run_config(budget_ms: u64) -> RunConfig {
        let args = CliArgs::parse_from([
            "test",
            "--cycles",
            "2",
            "--write-workers",
            "2",
            "--read-workers",
            "3",
            "--drivers",
            "50",
            "--write-ops",
            "10",
            "--single-get-ops",
            "9",
            "--radius-ops",
            "6",
            "--geohash-ops",
            "3",
            "--seed",
            "99",
            "--quiet",
        ]);
        let mut config = RunConfig::from_cli(&args).unwrap();
        for workload in [
            &mut config.write,
            &mut config.single_read,
            &mut config.radius_read,
            &mut config.prefix_read,
        ] {
            workload.budget = Duration::from_millis(budget_ms);
            workload.cycle_delay = Duration::from_millis(10);
        }
        config
    }

    #[test]
    fn test_runs_all_kinds_and_splits_totals() {
        let store = Arc::new(CountingStore::new());
        let summary = LoadRunner::new(store.clone(), run_config(300)).run().unwrap();

        // write: 2 cycles x 2 workers x quota 5
        assert_eq!(summary.write.operations, 20);
        assert_eq!(summary.write_per_minute, 10);
        // reads: 2 cycles x 3 workers x (3 + 2 + 1)
        assert_eq!(summary.read.operations, 36);
        assert_eq!(summary.read_per_minute, 18);
        assert_eq!(summary.workloads.len(), 4);
        assert_eq!(
            summary.workload(WorkloadKind::RadiusRead).map(|w| w.operations),
            Some(12)
        );
        assert_eq!(store.upserts.lock().len(), 20);
        assert_eq!(store.reads.lock().len(), 18);
    }

    #[test]
    fn test_single_read_holds_full_budget() {
        let store = Arc::new(CountingStore::new());
        let config = run_config(200);
        assert_eq!(config.single_read.quota_policy, QuotaPolicy::SleepUntilDeadline);

        let summary = LoadRunner::new(store, config).run().unwrap();
        let single = summary.workload(WorkloadKind::SingleRead).unwrap();
        // two cycles of a full budget each
        assert!(single.elapsed_secs >= 0.4);
    }

    #[test]
    fn test_write_and_read_cursors_are_independent() {
        let store = Arc::new(CountingStore::new());
        LoadRunner::new(store.clone(), run_config(300)).run().unwrap();

        let mut writes = store.upserts.lock().clone();
        writes.sort_unstable();
        assert_eq!(writes, (1..=20).collect::<Vec<u64>>());

        let mut reads = store.reads.lock().clone();
        reads.sort_unstable();
        assert_eq!(reads, (1..=18).collect::<Vec<u64>>());
    }

    #[test]
    fn test_errors_reach_the_summary() {
        let store = Arc::new(CountingStore::failing_every(2));
        let summary = LoadRunner::new(store, run_config(300)).run().unwrap();
        let attempts = summary.write.operations
            + summary.write.errors
            + summary.read.operations
            + summary.read.errors;
        assert_eq!(attempts, 56);
        assert_eq!(summary.total_errors(), 28);
    }
}
