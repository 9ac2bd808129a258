//! Load engine
//!
//! - IdSequencer: shared wrap-around driver id cursor
//! - Worker: one deadline/quota-bounded loop of backend calls
//! - Aggregator: bounded fan-in of worker stats
//! - WorkloadOrchestrator: spawn/join cycles of one workload kind
//! - LoadRunner: all four kinds concurrently

pub mod aggregator;
pub mod id_sequencer;
pub mod orchestrator;
pub mod runner;
pub mod worker;

pub use aggregator::{aggregate, stats_channel, AggregatedStats};
pub use id_sequencer::IdSequencer;
pub use orchestrator::{WorkloadOrchestrator, WorkloadTotals};
pub use runner::LoadRunner;
pub use worker::{Stats, Worker, WorkloadContext};
