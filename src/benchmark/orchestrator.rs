//! Cycle orchestration for one workload kind
//!
//! Each cycle spawns the configured number of workers, joins all of them,
//! then pauses for the inter-cycle delay. Stats flow through one bounded
//! channel that is closed and drained after the last cycle.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use super::aggregator::{aggregate, stats_channel, AggregatedStats};
use super::worker::{Worker, WorkloadContext};
use crate::config::WorkloadConfig;
use crate::utils::{LoadError, Result};
use crate::workload::WorkloadKind;

/// Outcome of every cycle of one workload kind
#[derive(Debug, Clone)]
pub struct WorkloadTotals {
    pub kind: WorkloadKind,
    pub cycle_count: u32,
    pub worker_count: u32,
    pub per_worker_quota: u64,
    /// Wall-clock time of all cycles, delays included
    pub elapsed: Duration,
    pub stats: AggregatedStats,
}

impl WorkloadTotals {
    pub fn operations(&self) -> u64 {
        self.stats.operations
    }

    pub fn errors(&self) -> u64 {
        self.stats.errors
    }

    /// Successful operations per one-minute cycle
    pub fn operations_per_minute(&self) -> u64 {
        self.stats.operations / u64::from(self.cycle_count.max(1))
    }
}

/// Progress bar counting finished workers of a workload kind
pub fn workload_progress_bar(kind: WorkloadKind, total_workers: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_workers);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} workers | {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(kind.as_str());
    pb
}

/// Runs the cycles of one workload kind
pub struct WorkloadOrchestrator {
    context: Arc<WorkloadContext>,
    progress: Option<ProgressBar>,
}

impl WorkloadOrchestrator {
    pub fn new(context: Arc<WorkloadContext>) -> Self {
        Self {
            context,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run every cycle of `config` and return the aggregated totals
    pub fn run(&self, config: &WorkloadConfig) -> Result<WorkloadTotals> {
        config.validate()?;

        let (sender, receiver) = stats_channel(config.expected_stats());
        let start = Instant::now();

        for cycle in 0..config.cycle_count {
            info!(
                "Starting {} test cycle {}/{} ({} workers, quota {} each)",
                config.kind,
                cycle + 1,
                config.cycle_count,
                config.worker_count,
                config.per_worker_quota()
            );

            let workers = (0..config.worker_count)
                .map(|worker_id| Worker::new(worker_id, cycle, config, Arc::clone(&self.context)))
                .collect::<Result<Vec<_>>>()?;

            let mut handles = Vec::with_capacity(workers.len());
            let mut spawn_error = None;
            for (worker_id, worker) in workers.into_iter().enumerate() {
                let sender = sender.clone();
                let spawned = thread::Builder::new()
                    .name(format!("{}-{}-{}", config.kind.short_name(), cycle, worker_id))
                    .spawn(move || {
                        let stats = worker.run();
                        // Capacity covers every record of the run
                        sender.send(stats).is_ok()
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        spawn_error = Some(LoadError::Worker(format!(
                            "failed to spawn {} worker: {}",
                            config.kind, e
                        )));
                        break;
                    }
                }
            }

            // Barrier: the next cycle starts only after every started worker is done
            let failed = self.join_cycle(handles, config.kind, cycle);
            if let Some(e) = spawn_error {
                return Err(e);
            }
            if failed > 0 {
                return Err(LoadError::Worker(format!(
                    "{} of {} {} workers did not report in cycle {}",
                    failed,
                    config.worker_count,
                    config.kind,
                    cycle + 1
                )));
            }

            if !config.cycle_delay.is_zero() {
                thread::sleep(config.cycle_delay);
            }
        }

        drop(sender);
        let stats = aggregate(receiver);

        if let Some(pb) = &self.progress {
            pb.finish_with_message(format!(
                "{} done: {} ops, {} errors",
                config.kind.as_str(),
                stats.operations,
                stats.errors
            ));
        }

        Ok(WorkloadTotals {
            kind: config.kind,
            cycle_count: config.cycle_count,
            worker_count: config.worker_count,
            per_worker_quota: config.per_worker_quota(),
            elapsed: start.elapsed(),
            stats,
        })
    }

    /// Join every handle; returns how many workers did not report
    fn join_cycle(&self, handles: Vec<JoinHandle<bool>>, kind: WorkloadKind, cycle: u32) -> usize {
        let mut failed = 0usize;
        for handle in handles {
            match handle.join() {
                Ok(true) => {}
                Ok(false) => failed += 1,
                Err(_) => {
                    error!("{} worker panicked in cycle {}", kind, cycle + 1);
                    failed += 1;
                }
            }
            if let Some(pb) = &self.progress {
                pb.inc(1);
            }
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::id_sequencer::IdSequencer;
    use crate::benchmark::worker::testing::CountingStore;
    use crate::config::{QuotaPolicy, SearchConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config(kind: WorkloadKind, cycles: u32, workers: u32, target: u64) -> WorkloadConfig {
        WorkloadConfig {
            cycle_count: cycles,
            worker_count: workers,
            ops_per_minute_target: target,
            keyspace_size: 1_000,
            budget: Duration::from_millis(500),
            cycle_delay: Duration::from_millis(50),
            quota_policy: QuotaPolicy::Stop,
            ..WorkloadConfig::new(kind)
        }
    }

    fn orchestrator(store: Arc<CountingStore>, ids: Option<Arc<IdSequencer>>) -> WorkloadOrchestrator {
        let mut ctx = WorkloadContext::new(store, SearchConfig::default(), 7);
        if let Some(ids) = ids {
            ctx = ctx.with_ids(ids);
        }
        WorkloadOrchestrator::new(Arc::new(ctx))
    }

    #[test]
    fn test_runs_every_cycle_and_worker() {
        let store = Arc::new(CountingStore::new());
        let ids = Arc::new(IdSequencer::new(1_000));
        let cfg = config(WorkloadKind::Write, 3, 4, 10);

        let totals = orchestrator(store.clone(), Some(ids)).run(&cfg).unwrap();

        // 3 cycles x 4 workers x quota 5
        assert_eq!(totals.stats.records, 12);
        assert_eq!(totals.operations(), 60);
        assert_eq!(totals.errors(), 0);
        assert_eq!(totals.operations_per_minute(), 20);
        assert_eq!(store.upserts.lock().len(), 60);
    }

    #[test]
    fn test_shared_sequencer_hands_out_distinct_ids() {
        let store = Arc::new(CountingStore::new());
        let ids = Arc::new(IdSequencer::new(1_000));
        let cfg = config(WorkloadKind::SingleRead, 1, 5, 100);

        orchestrator(store.clone(), Some(ids)).run(&cfg).unwrap();

        let mut seen = store.reads.lock().clone();
        seen.sort_unstable();
        assert_eq!(seen, (1..=100).collect::<Vec<u64>>());
    }

    #[test]
    fn test_delay_follows_every_cycle() {
        let store = Arc::new(CountingStore::new());
        let cfg = config(WorkloadKind::RadiusRead, 2, 2, 2);

        let totals = orchestrator(store, None).run(&cfg).unwrap();
        assert!(totals.elapsed >= cfg.cycle_delay * 2);
    }

    #[test]
    fn test_errors_are_aggregated() {
        let store = Arc::new(CountingStore::failing_every(4));
        let cfg = config(WorkloadKind::PrefixRead, 2, 2, 8);

        let totals = orchestrator(store, None).run(&cfg).unwrap();
        // 2 cycles x 2 workers x quota 4 = 16 attempts, every 4th fails
        assert_eq!(totals.operations() + totals.errors(), 16);
        assert_eq!(totals.errors(), 4);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let store = Arc::new(CountingStore::new());
        let cfg = config(WorkloadKind::Write, 0, 2, 8);
        assert!(matches!(
            orchestrator(store, None).run(&cfg),
            Err(LoadError::Config(_))
        ));
    }

    #[test]
    fn test_progress_counts_workers() {
        let store = Arc::new(CountingStore::new());
        let cfg = config(WorkloadKind::Write, 2, 3, 3);
        let pb = ProgressBar::hidden();
        pb.set_length(6);

        orchestrator(store, Some(Arc::new(IdSequencer::new(100))))
            .with_progress(pb.clone())
            .run(&cfg)
            .unwrap();
        assert_eq!(pb.position(), 6);
    }

    #[test]
    fn test_missing_sequencer_fails_before_any_call() {
        let store = Arc::new(CountingStore::new());
        let cfg = config(WorkloadKind::SingleRead, 1, 3, 9);
        assert!(matches!(
            orchestrator(store.clone(), None).run(&cfg),
            Err(LoadError::Config(_))
        ));
        assert!(store.reads.lock().is_empty());
    }

    #[test]
    fn test_join_cycle_waits_for_every_started_worker() {
        let store = Arc::new(CountingStore::new());
        let pb = ProgressBar::hidden();
        let orch = orchestrator(store, None).with_progress(pb.clone());

        let finished = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for i in 0..3 {
            let finished = Arc::clone(&finished);
            handles.push(thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                finished.fetch_add(1, Ordering::SeqCst);
                i != 1
            }));
        }
        handles.push(thread::spawn(|| -> bool { panic!("worker blew up") }));

        let failed = orch.join_cycle(handles, WorkloadKind::Write, 0);
        assert_eq!(failed, 2);
        assert_eq!(finished.load(Ordering::SeqCst), 3);
        assert_eq!(pb.position(), 4);
    }
}
