//! Command-line argument parsing
//!
//! Defaults reproduce the stock load profile: 20 writers, 25 readers per
//! read kind, one one-minute cycle over a million drivers.

use clap::Parser;
use std::path::PathBuf;

use super::workload_config::QuotaPolicy;

/// Mixed read/write load harness for a geospatial driver-location store
#[derive(Parser, Debug, Clone)]
#[command(name = "driver-load-bench")]
#[command(version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct CliArgs {
    /// Print help information
    #[arg(long = "help", action = clap::ArgAction::Help)]
    help: Option<bool>,

    // ===== Connection Options =====
    /// Primary server hostname (receives writes and, without replicas, reads)
    #[arg(short = 'h', long = "host", default_value = "127.0.0.1")]
    pub host: String,

    /// Primary server port
    #[arg(short = 'p', long = "port", default_value_t = 6379)]
    pub port: u16,

    /// Read replica as host:port (repeat for several; reads are balanced round-robin)
    #[arg(long = "replica", action = clap::ArgAction::Append)]
    pub replicas: Vec<String>,

    /// Password for AUTH command
    #[arg(short = 'a', long = "auth")]
    pub password: Option<String>,

    /// Username for ACL AUTH (requires --auth)
    #[arg(long = "user")]
    pub username: Option<String>,

    /// Connect timeout in milliseconds
    #[arg(long = "connect-timeout", default_value_t = 5000)]
    pub connect_timeout_ms: u64,

    /// Socket read/write timeout in milliseconds
    #[arg(long = "request-timeout", default_value_t = 30000)]
    pub request_timeout_ms: u64,

    /// Idle connections kept per node
    #[arg(long = "pool-size", default_value_t = 64)]
    pub pool_size: usize,

    // ===== Load Profile =====
    /// Number of cycles per workload kind
    #[arg(long = "cycles", default_value_t = 1)]
    pub cycles: u32,

    /// Concurrent writers per cycle
    #[arg(long = "write-workers", default_value_t = 20)]
    pub write_workers: u32,

    /// Concurrent readers per cycle, for each read kind
    #[arg(long = "read-workers", default_value_t = 25)]
    pub read_workers: u32,

    /// Number of distinct drivers (ids 1..=N)
    #[arg(short = 'n', long = "drivers", default_value_t = 1_000_000)]
    pub drivers: u64,

    /// Target upserts per minute
    #[arg(long = "write-ops", default_value_t = 1_000_000)]
    pub write_ops: u64,

    /// Target single-driver reads per minute
    #[arg(long = "single-get-ops", default_value_t = 1_000_000)]
    pub single_get_ops: u64,

    /// Target radius searches per minute
    #[arg(long = "radius-ops", default_value_t = 1_500_000)]
    pub radius_ops: u64,

    /// Target geohash/tariff searches per minute
    #[arg(long = "geohash-ops", default_value_t = 500_000)]
    pub geohash_ops: u64,

    /// Wall-clock budget of each worker in seconds
    #[arg(long = "budget", default_value_t = 60)]
    pub budget_secs: u64,

    /// Pause after each cycle in seconds
    #[arg(long = "cycle-delay", default_value_t = 2)]
    pub cycle_delay_secs: u64,

    /// Delay before read workloads start, in seconds (lets writers populate replicas)
    #[arg(long = "read-start-delay", default_value_t = 0)]
    pub read_start_delay_secs: u64,

    /// Quota behaviour of single-read workers
    #[arg(long = "single-read-quota", value_enum, default_value_t = QuotaPolicy::SleepUntilDeadline)]
    pub single_read_quota: QuotaPolicy,

    /// Quota behaviour of write, radius and geohash workers
    #[arg(long = "quota", value_enum, default_value_t = QuotaPolicy::Stop)]
    pub quota: QuotaPolicy,

    // ===== Search Options =====
    /// Search index name
    #[arg(long = "index-name", default_value = "index")]
    pub index_name: String,

    /// Radius of the geo search in kilometres
    #[arg(long = "radius-km", default_value_t = 5.0)]
    pub radius_km: f64,

    /// Result limit of the radius search
    #[arg(long = "radius-limit", default_value_t = 30)]
    pub radius_limit: usize,

    /// Result limit of the geohash/tariff search
    #[arg(long = "order-limit", default_value_t = 5)]
    pub order_limit: usize,

    /// Geohash characters used as search prefix (1-12)
    #[arg(long = "geohash-precision", default_value_t = 10)]
    pub geohash_precision: usize,

    // ===== Setup =====
    /// Do not FLUSHDB before the run
    #[arg(long = "skip-flush")]
    pub skip_flush: bool,

    /// Do not create the search index (it must already exist)
    #[arg(long = "skip-index-create")]
    pub skip_index_create: bool,

    /// Seed for synthetic data (0 = random seed)
    #[arg(long = "seed", default_value_t = 0)]
    pub seed: u64,

    // ===== Output =====
    /// Write the run summary as JSON to this file
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Quiet mode (errors only, no progress bars)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.username.is_some() && self.password.is_none() {
            return Err("--user requires --auth to be set".to_string());
        }

        if self.cycles == 0 {
            return Err("--cycles must be at least 1".to_string());
        }

        if self.write_workers == 0 || self.read_workers == 0 {
            return Err("--write-workers and --read-workers must be at least 1".to_string());
        }

        if self.drivers == 0 {
            return Err("--drivers must be at least 1".to_string());
        }

        if self.budget_secs == 0 {
            return Err("--budget must be at least 1 second".to_string());
        }

        if !(1..=12).contains(&self.geohash_precision) {
            return Err("--geohash-precision must be between 1 and 12".to_string());
        }

        if !(self.radius_km > 0.0) {
            return Err("--radius-km must be positive".to_string());
        }

        if self.pool_size == 0 {
            return Err("--pool-size must be at least 1".to_string());
        }

        Ok(())
    }
}
