//! bytestat: aggregator server and scan client in one binary.
//!
//! `bytestat serve` runs the aggregator: it accepts submissions, keeps
//! the running global histogram in memory, and optionally journals each
//! accepted submission to a JSON-lines file.
//!
//! `bytestat scan` walks a directory, submits one histogram per file
//! concurrently, then fetches the global aggregate and prints it sorted
//! ascending by count, followed by a scan summary.

mod config;
mod storage;
mod walker;

use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bytestat_core::client;
use bytestat_core::metrics::ScanMetrics;
use bytestat_core::{AggregateStore, Dispatcher, NullSink, SortedReport, SubmissionSink};

use config::{Config, Mode};
use storage::JsonlSink;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("run `bytestat --help` for usage");
            std::process::exit(2);
        }
    };

    let result = match config.mode {
        Mode::Serve { listen, journal } => serve(&listen, journal.as_deref()),
        Mode::Scan { server, dir } => scan(&server, &dir),
    };

    if let Err(e) = result {
        error!(error = %e, "run failed");
        std::process::exit(1);
    }
}

/// Run the aggregator until the process is killed.
fn serve(listen: &str, journal: Option<&Path>) -> bytestat_core::Result<()> {
    let sink: Arc<dyn SubmissionSink> = match journal {
        Some(path) => {
            info!(path = %path.display(), "journaling submissions");
            Arc::new(JsonlSink::open(path)?)
        }
        None => Arc::new(NullSink),
    };

    let store = Arc::new(AggregateStore::new());
    let listener = TcpListener::bind(listen)?;
    let dispatcher = Arc::new(Dispatcher::new(store, sink));

    dispatcher.serve(listener)
}

/// Walk, submit, fetch, and print the sorted aggregate.
fn scan(server: &str, dir: &Path) -> bytestat_core::Result<()> {
    let root = std::fs::canonicalize(dir)?;

    let files = walker::list_files(&root);
    info!(files = files.len(), root = %root.display(), "found files");

    let metrics = Arc::new(ScanMetrics::new());
    client::scan_and_submit(server, files, &metrics);

    let snapshot = client::fetch_aggregate(server)?;
    let report = SortedReport::from_histogram(&snapshot);
    for line in report.lines() {
        println!("{line}");
    }

    metrics.print_summary();
    Ok(())
}
