//! Metrics for a scan-and-submit run.
//!
//! Tracks what the client did: files discovered, bytes counted, and how
//! many submissions succeeded or failed. Submission workers run
//! concurrently, so counters are relaxed atomics; the aggregated view
//! is only read after the join barrier, when all workers have finished.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters for one scan run.
#[derive(Debug)]
pub struct ScanMetrics {
    start_time: Instant,

    /// Regular files found under the scan root
    files_found: AtomicU64,

    /// Bytes counted across all successfully read files
    bytes_counted: AtomicU64,

    /// Submissions accepted by the aggregator
    submissions_ok: AtomicU64,

    /// Files whose read or submission failed
    submissions_failed: AtomicU64,
}

impl ScanMetrics {
    /// Create metrics with the start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            files_found: AtomicU64::new(0),
            bytes_counted: AtomicU64::new(0),
            submissions_ok: AtomicU64::new(0),
            submissions_failed: AtomicU64::new(0),
        }
    }

    /// Record the number of files the walk produced.
    pub fn record_files_found(&self, count: u64) {
        self.files_found.store(count, Ordering::Relaxed);
    }

    /// Record one successful submission of `bytes` counted bytes.
    pub fn record_submission(&self, bytes: u64) {
        self.bytes_counted.fetch_add(bytes, Ordering::Relaxed);
        self.submissions_ok.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one failed read or submission.
    pub fn record_failure(&self) {
        self.submissions_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Files found by the walk.
    pub fn files_found(&self) -> u64 {
        self.files_found.load(Ordering::Relaxed)
    }

    /// Successful submissions.
    pub fn submissions_ok(&self) -> u64 {
        self.submissions_ok.load(Ordering::Relaxed)
    }

    /// Failed reads or submissions.
    pub fn submissions_failed(&self) -> u64 {
        self.submissions_failed.load(Ordering::Relaxed)
    }

    /// Bytes counted across successful submissions.
    pub fn bytes_counted(&self) -> u64 {
        self.bytes_counted.load(Ordering::Relaxed)
    }

    /// Elapsed time since the run started.
    pub fn duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Scan Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!("Files found: {}", self.files_found());
        println!("Submitted: {}", self.submissions_ok());
        println!("Failed: {}", self.submissions_failed());
        println!(
            "Bytes counted: {} ({:.2} MiB)",
            self.bytes_counted(),
            self.bytes_counted() as f64 / 1024.0 / 1024.0
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}
