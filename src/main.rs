//! driver-load-bench - mixed read/write load against a driver-location store
//!
//! Upserts drivers, reads them back by id and runs radius and geohash/tariff
//! searches, all four concurrently, then reports totals and latency.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use driver_load_bench::benchmark::LoadRunner;
use driver_load_bench::client::{Backend, BackendExt, ConnectionBalancer, ConnectionPool};
use driver_load_bench::config::{CliArgs, RunConfig};
use driver_load_bench::metrics::SummaryReporter;
use driver_load_bench::workload::{create_driver_index, DriverRepository};

/// Settle time after FLUSHDB before the index is created
const FLUSH_SETTLE: Duration = Duration::from_secs(2);

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn print_banner(config: &RunConfig) {
    if config.quiet {
        return;
    }

    println!("driver-load-bench v{}", env!("CARGO_PKG_VERSION"));
    println!("====================================");
    println!("Primary: {}", config.primary);
    if !config.replicas.is_empty() {
        println!(
            "Replicas: {}",
            config
                .replicas
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    println!(
        "Drivers: {}, Cycles: {}, Budget: {:?}",
        config.write.keyspace_size, config.write.cycle_count, config.write.budget
    );
    for workload in config.workloads() {
        println!(
            "  {:22} workers={:<4} target/min={:<10} quota={:<8} policy={:?}",
            workload.kind.as_str(),
            workload.worker_count,
            workload.ops_per_minute_target,
            workload.per_worker_quota(),
            workload.quota_policy
        );
    }
    println!("====================================\n");
}

fn run() -> Result<()> {
    let args = CliArgs::parse_args();
    setup_logging(args.verbose, args.quiet);

    let config = RunConfig::from_cli(&args)?;
    print_banner(&config);

    let factory = config.connection_factory();
    let primary: Arc<dyn Backend> = Arc::new(ConnectionPool::new(
        config.primary.clone(),
        factory.clone(),
        config.pool_size,
    ));

    primary
        .ping()
        .map_err(|e| anyhow::anyhow!("Connection error to {}: {}", config.primary, e))?;
    info!("Connected to primary {}", config.primary);

    if config.flush {
        info!("Flushing all existing data...");
        primary
            .flushdb()
            .map_err(|e| anyhow::anyhow!("Failed to flush database: {}", e))?;
        thread::sleep(FLUSH_SETTLE);
        info!("Database flushed");
    }

    if config.create_index {
        info!("Creating index '{}'...", config.search.index_name);
        create_driver_index(primary.as_ref(), &config.search)
            .map_err(|e| anyhow::anyhow!("Failed to create index: {}", e))?;
    }

    let readers = if config.replicas.is_empty() {
        ConnectionBalancer::verified(vec![Arc::clone(&primary)])?
    } else {
        ConnectionBalancer::connect(&config.read_addresses(), &factory, config.pool_size)?
    };

    let store = Arc::new(DriverRepository::new(
        primary,
        readers,
        config.search.clone(),
    ));
    let summary = LoadRunner::new(store, config.clone()).run()?;

    let reporter = SummaryReporter::new();
    reporter.report(&summary)?;

    if let Some(ref output_path) = config.output_path {
        info!("Writing results to: {:?}", output_path);
        reporter.write_json_file(output_path, &summary)?;
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
