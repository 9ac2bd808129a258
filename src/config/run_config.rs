//! Run configuration derived from CLI arguments

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::cli::CliArgs;
use super::search_config::SearchConfig;
use super::workload_config::WorkloadConfig;
use crate::client::ConnectionFactory;
use crate::utils::{ConnectionError, LoadError, Result};
use crate::workload::WorkloadKind;

/// Resolved server address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }

    /// Parse `host:port`
    pub fn parse(s: &str) -> std::result::Result<Self, ConnectionError> {
        let invalid = || ConnectionError::InvalidAddress(s.to_string());
        let (host, port) = s.trim().rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse().map_err(|_| invalid())?;
        Ok(Self::new(host, port))
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub password: String,
    pub username: Option<String>,
}

/// Complete run configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    // Connection
    pub primary: ServerAddress,
    pub replicas: Vec<ServerAddress>,
    pub auth: Option<AuthConfig>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub pool_size: usize,

    // Workloads
    pub write: WorkloadConfig,
    pub single_read: WorkloadConfig,
    pub radius_read: WorkloadConfig,
    pub prefix_read: WorkloadConfig,
    pub read_start_delay: Duration,

    // Data and search
    pub search: SearchConfig,
    pub seed: u64,

    // Setup
    pub flush: bool,
    pub create_index: bool,

    // Output
    pub output_path: Option<PathBuf>,
    pub quiet: bool,
    pub verbose: bool,
}

impl RunConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        args.validate().map_err(LoadError::Config)?;

        let replicas = args
            .replicas
            .iter()
            .map(|r| ServerAddress::parse(r))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let auth = args.password.as_ref().map(|p| AuthConfig {
            password: p.clone(),
            username: args.username.clone(),
        });

        let workload = |kind: WorkloadKind, workers: u32, target: u64| WorkloadConfig {
            kind,
            cycle_count: args.cycles,
            worker_count: workers,
            ops_per_minute_target: target,
            keyspace_size: args.drivers,
            budget: Duration::from_secs(args.budget_secs),
            cycle_delay: Duration::from_secs(args.cycle_delay_secs),
            quota_policy: if kind == WorkloadKind::SingleRead {
                args.single_read_quota
            } else {
                args.quota
            },
        };

        let config = Self {
            primary: ServerAddress::new(&args.host, args.port),
            replicas,
            auth,
            connect_timeout_ms: args.connect_timeout_ms,
            request_timeout_ms: args.request_timeout_ms,
            pool_size: args.pool_size,

            write: workload(WorkloadKind::Write, args.write_workers, args.write_ops),
            single_read: workload(WorkloadKind::SingleRead, args.read_workers, args.single_get_ops),
            radius_read: workload(WorkloadKind::RadiusRead, args.read_workers, args.radius_ops),
            prefix_read: workload(WorkloadKind::PrefixRead, args.read_workers, args.geohash_ops),
            read_start_delay: Duration::from_secs(args.read_start_delay_secs),

            search: SearchConfig::from_cli(args),
            seed: args.seed,

            flush: !args.skip_flush,
            create_index: !args.skip_index_create,

            output_path: args.output.clone(),
            quiet: args.quiet,
            verbose: args.verbose,
        };

        for workload in config.workloads() {
            workload.validate()?;
        }
        Ok(config)
    }

    /// The four workload configs in launch order
    pub fn workloads(&self) -> [&WorkloadConfig; 4] {
        [
            &self.write,
            &self.single_read,
            &self.radius_read,
            &self.prefix_read,
        ]
    }

    pub fn connection_factory(&self) -> ConnectionFactory {
        ConnectionFactory {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            auth_password: self.auth.as_ref().map(|a| a.password.clone()),
            auth_username: self.auth.as_ref().and_then(|a| a.username.clone()),
        }
    }

    /// Nodes serving reads: the replicas, or the primary when none are set
    pub fn read_addresses(&self) -> Vec<ServerAddress> {
        if self.replicas.is_empty() {
            vec![self.primary.clone()]
        } else {
            self.replicas.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuotaPolicy;
    use clap::Parser;

    #[test]
    fn test_parse_address() {
        let addr = ServerAddress::parse("localhost:6380").unwrap();
        assert_eq!(addr, ServerAddress::new("localhost", 6380));
        assert_eq!(addr.to_string(), "localhost:6380");
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        assert!(ServerAddress::parse("localhost").is_err());
        assert!(ServerAddress::parse(":6379").is_err());
        assert!(ServerAddress::parse("host:notaport").is_err());
    }

    #[test]
    fn test_from_cli_builds_four_workloads() {
        let args = CliArgs::parse_from(["test", "--cycles", "3", "--budget", "5"]);
        let config = RunConfig::from_cli(&args).unwrap();

        let kinds: Vec<_> = config.workloads().iter().map(|w| w.kind).collect();
        assert_eq!(kinds, WorkloadKind::ALL.to_vec());
        assert!(config.workloads().iter().all(|w| w.cycle_count == 3));
        assert_eq!(config.write.worker_count, 20);
        assert_eq!(config.radius_read.worker_count, 25);
        assert_eq!(config.single_read.budget, Duration::from_secs(5));
        assert_eq!(config.single_read.quota_policy, QuotaPolicy::SleepUntilDeadline);
        assert_eq!(config.prefix_read.quota_policy, QuotaPolicy::Stop);
        assert!(config.flush && config.create_index);
    }

    #[test]
    fn test_reads_fall_back_to_primary() {
        let args = CliArgs::parse_from(["test", "-h", "db1", "-p", "7000"]);
        let config = RunConfig::from_cli(&args).unwrap();
        assert_eq!(config.read_addresses(), vec![ServerAddress::new("db1", 7000)]);

        let args = CliArgs::parse_from(["test", "--replica", "r1:6380", "--replica", "r2:6381"]);
        let config = RunConfig::from_cli(&args).unwrap();
        assert_eq!(
            config.read_addresses(),
            vec![ServerAddress::new("r1", 6380), ServerAddress::new("r2", 6381)]
        );
    }

    #[test]
    fn test_bad_replica_is_config_error() {
        let args = CliArgs::parse_from(["test", "--replica", "nope"]);
        assert!(matches!(
            RunConfig::from_cli(&args),
            Err(LoadError::Connection(ConnectionError::InvalidAddress(_)))
        ));
    }
}
