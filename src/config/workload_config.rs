//! Per-workload configuration
//!
//! Each of the four workload kinds gets its own `WorkloadConfig`. It is
//! built once from the CLI and read-only for the rest of the run.

use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;

use crate::utils::{LoadError, Result};
use crate::workload::WorkloadKind;

/// What a worker does once it has used up its quota before the deadline
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuotaPolicy {
    /// Return immediately; reported duration is shorter than the budget
    Stop,
    /// Sleep out the rest of the budget; reported duration equals the budget
    SleepUntilDeadline,
}

/// Configuration for a single workload kind
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    pub kind: WorkloadKind,

    /// Number of spawn/join rounds
    pub cycle_count: u32,

    /// Workers launched per cycle
    pub worker_count: u32,

    /// Target operations per minute across all workers of one cycle
    pub ops_per_minute_target: u64,

    /// Number of distinct driver ids (1..=keyspace_size)
    pub keyspace_size: u64,

    /// Wall-clock budget of each worker
    pub budget: Duration,

    /// Pause after each cycle's barrier
    pub cycle_delay: Duration,

    pub quota_policy: QuotaPolicy,
}

impl WorkloadConfig {
    /// Create a config with the stock defaults for `kind`
    pub fn new(kind: WorkloadKind) -> Self {
        Self {
            kind,
            cycle_count: 1,
            worker_count: 1,
            ops_per_minute_target: 1_000,
            keyspace_size: 1_000_000,
            budget: Duration::from_secs(60),
            cycle_delay: Duration::from_secs(2),
            quota_policy: kind.default_quota_policy(),
        }
    }

    /// Maximum attempts of one worker in one cycle.
    ///
    /// `ceil(target / workers)` plus the division remainder, so the summed
    /// capacity of all workers never falls below the target.
    pub fn per_worker_quota(&self) -> u64 {
        let workers = u64::from(self.worker_count.max(1));
        self.ops_per_minute_target.div_ceil(workers) + self.ops_per_minute_target % workers
    }

    /// Total Stats records the run will produce
    pub fn expected_stats(&self) -> usize {
        self.worker_count as usize * self.cycle_count as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.cycle_count == 0 {
            return Err(LoadError::Config(format!(
                "{}: cycle count must be at least 1",
                self.kind
            )));
        }
        if self.worker_count == 0 {
            return Err(LoadError::Config(format!(
                "{}: worker count must be at least 1",
                self.kind
            )));
        }
        if self.kind.uses_id_sequence() && self.keyspace_size == 0 {
            return Err(LoadError::Config(format!(
                "{}: keyspace size must be at least 1",
                self.kind
            )));
        }
        if self.budget.is_zero() {
            return Err(LoadError::Config(format!(
                "{}: worker budget must be positive",
                self.kind
            )));
        }
        Ok(())
    }
}
