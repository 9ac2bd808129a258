//! Summary reporter - console output and JSON export

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use super::collector::{RunSummary, WorkloadSummary};

/// Run summary reporter
#[derive(Debug, Default)]
pub struct SummaryReporter;

impl SummaryReporter {
    pub fn new() -> Self {
        Self
    }

    /// Print the summary to stdout
    pub fn report(&self, summary: &RunSummary) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_console(&mut out, summary)
    }

    /// Write the summary as pretty JSON to `path`
    pub fn write_json_file(&self, path: &Path, summary: &RunSummary) -> io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "{}", to_json_string(summary)?)?;
        Ok(())
    }
}

fn to_json_string(summary: &RunSummary) -> io::Result<String> {
    serde_json::to_string_pretty(summary).map_err(io::Error::from)
}

/// Human-readable report: write and read roll-ups, then one line per kind
pub fn write_console<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    writeln!(out, "\n|===== Summary of Write operations =====|")?;
    writeln!(out, "Total Write Operations: {}", summary.write.operations)?;
    writeln!(
        out,
        "Total Write Operations per minute: {}",
        summary.write_per_minute
    )?;
    writeln!(out, "Total Write Errors: {}", summary.write.errors)?;

    writeln!(out, "\n|===== Summary of Read operations =====|")?;
    writeln!(out, "Total Read Operations: {}", summary.read.operations)?;
    writeln!(
        out,
        "Total Read Operations per minute: {}",
        summary.read_per_minute
    )?;
    writeln!(out, "Total Read Errors: {}", summary.read.errors)?;

    writeln!(out, "\nPer-workload breakdown:")?;
    writeln!(
        out,
        "{:22} {:>8} {:>12} {:>10} {:>12} {:>10} {:>10} {:>10}",
        "Workload", "Workers", "Ops", "Errors", "Ops/min", "p50 (ms)", "p99 (ms)", "Max (ms)"
    )?;
    writeln!(out, "{}", "-".repeat(102))?;
    for workload in &summary.workloads {
        write_workload_row(out, workload)?;
    }
    writeln!(out, "\nElapsed: {:.2}s over {} cycle(s)", summary.elapsed_secs, summary.cycles)
}

fn write_workload_row<W: Write>(out: &mut W, w: &WorkloadSummary) -> io::Result<()> {
    writeln!(
        out,
        "{:22} {:>8} {:>12} {:>10} {:>12} {:>10.3} {:>10.3} {:>10.3}",
        w.name,
        w.workers,
        w.operations,
        w.errors,
        w.operations_per_minute,
        w.latency.p50_ms,
        w.latency.p99_ms,
        w.latency.max_ms
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::collector::{LatencySummary, OperationTotals};
    use crate::workload::WorkloadKind;

    fn summary() -> RunSummary {
        let write = OperationTotals {
            operations: 2_000,
            errors: 3,
        };
        let read = OperationTotals {
            operations: 6_000,
            errors: 0,
        };
        let radius = WorkloadSummary {
            kind: WorkloadKind::RadiusRead,
            name: WorkloadKind::RadiusRead.as_str(),
            cycles: 2,
            workers: 25,
            per_worker_quota: 60_000,
            operations: 1_500,
            errors: 0,
            operations_per_minute: 750,
            elapsed_secs: 124.0,
            slowest_worker_secs: 60.0,
            latency: LatencySummary {
                p50_ms: 0.5,
                p99_ms: 2.25,
                max_ms: 10.0,
            },
        };
        RunSummary::new(2, 124.5, write, read, vec![radius])
    }

    #[test]
    fn test_console_report() {
        let mut buf = Vec::new();
        write_console(&mut buf, &summary()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Total Write Operations: 2000"));
        assert!(text.contains("Total Write Operations per minute: 1000"));
        assert!(text.contains("Total Write Errors: 3"));
        assert!(text.contains("Total Read Operations per minute: 3000"));
        assert!(text.contains("List GET in Radius"));
        assert!(text.contains("2.250"));
    }

    #[test]
    fn test_json_export() {
        let path = std::env::temp_dir().join(format!("driver-summary-{}.json", std::process::id()));
        SummaryReporter::new()
            .write_json_file(&path, &summary())
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(value["write"]["operations"], 2000);
        assert_eq!(value["read_per_minute"], 3000);
        assert_eq!(value["workloads"][0]["kind"], "radius-read");
        assert_eq!(value["workloads"][0]["latency"]["p99_ms"], 2.25);
        assert_eq!(value["workloads"][0]["slowest_worker_secs"], 60.0);
    }
}
