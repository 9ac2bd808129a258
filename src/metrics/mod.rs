//! Run summary and reporting
//!
//! - Per-kind figures with latency percentiles
//! - Write/read roll-ups with per-minute rates
//! - Console report and JSON file export

pub mod collector;
pub mod reporter;

pub use collector::{LatencySummary, OperationTotals, RunSummary, WorkloadSummary};
pub use reporter::SummaryReporter;
