//! Load worker thread implementation
//!
//! A worker issues one kind of backend call in a loop until its budget
//! elapses or its quota is used up, then reports a single `Stats` record.
//! Failed calls are counted and logged; they never end the loop.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hdrhistogram::Histogram;
use tracing::{debug, warn};

use super::id_sequencer::IdSequencer;
use crate::config::{QuotaPolicy, SearchConfig, WorkloadConfig};
use crate::dataset::{join_tariffs, DriverGenerator, Location, Tariff};
use crate::utils::{LoadError, OperationError};
use crate::workload::{DriverStore, WorkloadKind};

/// Highest trackable latency in microseconds (one hour)
const MAX_LATENCY_US: u64 = 3_600_000_000;

/// Latency histogram in microseconds, three significant digits
pub fn latency_histogram() -> Histogram<u64> {
    Histogram::new_with_bounds(1, MAX_LATENCY_US, 3).expect("Failed to create histogram")
}

/// Result of one worker in one cycle
#[derive(Debug, Clone)]
pub struct Stats {
    pub worker_id: u32,
    pub cycle_id: u32,
    /// Successful backend calls
    pub operations: u64,
    /// Failed backend calls
    pub errors: u64,
    /// Wall-clock time from worker start to report
    pub duration: Duration,
    /// Per-attempt latency (microseconds)
    pub histogram: Histogram<u64>,
}

/// Everything the workers of one workload kind share
pub struct WorkloadContext {
    pub store: Arc<dyn DriverStore>,
    /// Shared id cursor, required by kinds that address drivers by id
    pub ids: Option<Arc<IdSequencer>>,
    pub search: SearchConfig,
    /// Base seed for worker generators, 0 for random
    pub seed: u64,
}

impl WorkloadContext {
    pub fn new(store: Arc<dyn DriverStore>, search: SearchConfig, seed: u64) -> Self {
        Self {
            store,
            ids: None,
            search,
            seed,
        }
    }

    pub fn with_ids(mut self, ids: Arc<IdSequencer>) -> Self {
        self.ids = Some(ids);
        self
    }
}

/// Where a worker's next input comes from
enum Plan {
    Upsert(Arc<IdSequencer>),
    Read(Arc<IdSequencer>),
    Radius,
    Prefix,
}

impl Plan {
    fn for_kind(kind: WorkloadKind, ids: Option<&Arc<IdSequencer>>) -> Result<Self, LoadError> {
        match (kind, ids) {
            (WorkloadKind::Write, Some(ids)) => Ok(Plan::Upsert(Arc::clone(ids))),
            (WorkloadKind::SingleRead, Some(ids)) => Ok(Plan::Read(Arc::clone(ids))),
            (WorkloadKind::RadiusRead, _) => Ok(Plan::Radius),
            (WorkloadKind::PrefixRead, _) => Ok(Plan::Prefix),
            (kind, None) => Err(LoadError::Config(format!(
                "{} workers need a shared id sequencer",
                kind
            ))),
        }
    }
}

/// Input of one attempt, kept for error reporting
enum Target {
    Upsert(u64),
    Read(u64),
    Point(Location),
    Area { prefix: String, tariffs: Vec<Tariff> },
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Upsert(id) | Target::Read(id) => write!(f, "driver {}", id),
            Target::Point(loc) => write!(f, "point ({:.6}, {:.6})", loc.lat, loc.lng),
            Target::Area { prefix, tariffs } => {
                write!(f, "geohash {}* tariffs {}", prefix, join_tariffs(tariffs))
            }
        }
    }
}

/// One worker of one cycle (runs in a dedicated OS thread)
pub struct Worker {
    worker_id: u32,
    cycle_id: u32,
    kind: WorkloadKind,
    quota: u64,
    budget: Duration,
    quota_policy: QuotaPolicy,
    context: Arc<WorkloadContext>,
    plan: Plan,
    generator: DriverGenerator,
    histogram: Histogram<u64>,
}

impl Worker {
    /// Fails when the kind draws ids and the context has no sequencer
    pub fn new(
        worker_id: u32,
        cycle_id: u32,
        config: &WorkloadConfig,
        context: Arc<WorkloadContext>,
    ) -> Result<Self, LoadError> {
        let plan = Plan::for_kind(config.kind, context.ids.as_ref())?;

        // Distinct deterministic stream per worker when a seed is given
        let seed = if context.seed == 0 {
            0
        } else {
            context
                .seed
                .wrapping_add(u64::from(cycle_id) << 32)
                .wrapping_add(u64::from(worker_id))
                .max(1)
        };
        let generator = DriverGenerator::new(seed, context.search.geohash_precision);

        Ok(Self {
            worker_id,
            cycle_id,
            kind: config.kind,
            quota: config.per_worker_quota(),
            budget: config.budget,
            quota_policy: config.quota_policy,
            context,
            plan,
            generator,
            histogram: latency_histogram(),
        })
    }

    /// Run the loop until the deadline or the quota, whichever comes first
    pub fn run(mut self) -> Stats {
        let start = Instant::now();
        let deadline = start + self.budget;
        let mut operations = 0u64;
        let mut errors = 0u64;

        while Instant::now() < deadline {
            let target = self.next_target();

            let op_start = Instant::now();
            let result = self.execute(&target);
            let latency_us = op_start.elapsed().as_micros() as u64;
            let _ = self.histogram.record(latency_us.clamp(1, MAX_LATENCY_US));

            match result {
                Ok(()) => operations += 1,
                Err(e) => {
                    errors += 1;
                    warn!(
                        "Worker {} (cycle {}): {} failed for {}: {}",
                        self.worker_id, self.cycle_id, self.kind, target, e
                    );
                }
            }

            if operations + errors >= self.quota {
                debug!(
                    "Worker {} (cycle {}): {} quota of {} reached",
                    self.worker_id, self.cycle_id, self.kind, self.quota
                );
                if self.quota_policy == QuotaPolicy::SleepUntilDeadline {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if !remaining.is_zero() {
                        thread::sleep(remaining);
                    }
                }
                break;
            }
        }

        Stats {
            worker_id: self.worker_id,
            cycle_id: self.cycle_id,
            operations,
            errors,
            duration: start.elapsed(),
            histogram: self.histogram,
        }
    }

    fn next_target(&mut self) -> Target {
        match &self.plan {
            Plan::Upsert(ids) => Target::Upsert(ids.next()),
            Plan::Read(ids) => Target::Read(ids.next()),
            Plan::Radius => Target::Point(self.generator.location()),
            Plan::Prefix => {
                let (_, prefix) = self.generator.location_with_hash();
                Target::Area {
                    prefix,
                    tariffs: self.generator.tariffs(),
                }
            }
        }
    }

    fn execute(&mut self, target: &Target) -> Result<(), OperationError> {
        let store = &self.context.store;
        let search = &self.context.search;

        match target {
            Target::Upsert(id) => {
                let driver = self.generator.driver(*id);
                store.upsert_driver(&driver)
            }
            // An absent driver is a valid answer, not a failure
            Target::Read(id) => store.get_driver(*id).map(|_| ()),
            Target::Point(center) => store
                .drivers_in_radius(*center, search.radius_km, search.radius_limit)
                .map(|_| ()),
            Target::Area { prefix, tariffs } => store
                .drivers_for_order(prefix, tariffs, search.order_limit)
                .map(|_| ()),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory driver stores for engine tests

    use super::*;
    use crate::dataset::Driver;
    use parking_lot::Mutex;
    use std::io;

    /// Counts calls per operation; optionally fails every `fail_every`-th call
    #[derive(Default)]
    pub struct CountingStore {
        pub upserts: Mutex<Vec<u64>>,
        pub reads: Mutex<Vec<u64>>,
        pub searches: Mutex<u64>,
        pub fail_every: u64,
        pub latency: Duration,
        calls: Mutex<u64>,
    }

    impl CountingStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_every(n: u64) -> Self {
            Self {
                fail_every: n,
                ..Self::default()
            }
        }

        pub fn slow(latency: Duration) -> Self {
            Self {
                latency,
                ..Self::default()
            }
        }

        fn tick(&self) -> Result<(), OperationError> {
            if !self.latency.is_zero() {
                thread::sleep(self.latency);
            }
            let mut calls = self.calls.lock();
            *calls += 1;
            if self.fail_every > 0 && *calls % self.fail_every == 0 {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "timed out").into());
            }
            Ok(())
        }
    }

    impl DriverStore for CountingStore {
        fn upsert_driver(&self, driver: &Driver) -> Result<(), OperationError> {
            self.upserts.lock().push(driver.id);
            self.tick()
        }

        fn get_driver(&self, id: u64) -> Result<Option<Driver>, OperationError> {
            self.reads.lock().push(id);
            self.tick().map(|_| None)
        }

        fn drivers_in_radius(
            &self,
            _center: Location,
            _radius_km: f64,
            _limit: usize,
        ) -> Result<Vec<Driver>, OperationError> {
            *self.searches.lock() += 1;
            self.tick().map(|_| Vec::new())
        }

        fn drivers_for_order(
            &self,
            _geohash_prefix: &str,
            _tariffs: &[Tariff],
            _limit: usize,
        ) -> Result<Vec<Driver>, OperationError> {
            *self.searches.lock() += 1;
            self.tick().map(|_| Vec::new())
        }
    }
}
