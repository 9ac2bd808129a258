//! Configuration module

pub mod cli;
pub mod run_config;
pub mod search_config;
pub mod workload_config;

pub use cli::CliArgs;
pub use run_config::{AuthConfig, RunConfig, ServerAddress};
pub use search_config::{SearchConfig, DRIVER_KEY_PREFIX};
pub use workload_config::{QuotaPolicy, WorkloadConfig};
