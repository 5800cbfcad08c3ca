//! Scan-and-submit client.
//!
//! For each file the walker found, a worker thread reads the file,
//! builds its histogram, and submits it to the aggregator over a fresh
//! connection. A failed read or submission loses only that file's
//! contribution; the run continues. All workers are joined before the
//! final aggregate fetch, so the snapshot reflects every submission
//! that completed successfully.
//!
//! One thread per file, unbounded, like the rest of the system's
//! fan-out. Fine at the intended scale; a worker pool is the obvious
//! bound to add if directory trees grow large.

use std::net::{Shutdown, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};

use crate::codec::{self, Request};
use crate::error::Result;
use crate::framing;
use crate::histogram::ByteHistogram;
use crate::metrics::ScanMetrics;

/// Send one request over a fresh connection and read the full response.
///
/// The write side is shut down after the request so the aggregator's
/// reader observes a deterministic end-of-stream instead of relying on
/// the short-read heuristic alone. An empty return means the server
/// closed without responding.
fn send_request(server: &str, request: &[u8]) -> Result<Vec<u8>> {
    let mut stream = TcpStream::connect(server)?;

    framing::write_message(&mut stream, request)?;
    stream.shutdown(Shutdown::Write)?;

    framing::read_message(&mut stream)
}

/// Submit one histogram as an ADD request.
///
/// Success is the server closing the connection cleanly; ADD has no
/// response payload and any stray bytes are ignored.
pub fn submit(server: &str, histogram: &ByteHistogram) -> Result<()> {
    let request = codec::encode_request(&Request::Add(histogram.clone()))?;
    send_request(server, &request)?;
    Ok(())
}

/// Read a file, count its bytes, and submit the histogram.
///
/// Returns the number of bytes counted.
pub fn submit_file(server: &str, path: &Path) -> Result<u64> {
    let data = std::fs::read(path)?;
    let histogram = ByteHistogram::from_bytes(path.display().to_string(), &data);

    submit(server, &histogram)?;
    Ok(data.len() as u64)
}

/// Fetch the aggregator's current global snapshot.
///
/// A server that closes without responding yields an empty message,
/// which fails histogram decoding; "no response" is an error, not an
/// empty snapshot.
pub fn fetch_aggregate(server: &str) -> Result<ByteHistogram> {
    let request = codec::encode_request(&Request::Get)?;
    let response = send_request(server, &request)?;
    codec::decode_histogram(&response)
}

/// Submit every file concurrently and wait for all attempts to finish.
///
/// One worker thread per file. Per-file failures are logged and
/// counted, never propagated. Returns only after every worker has been
/// joined: the caller's subsequent [`fetch_aggregate`] is guaranteed to
/// observe every submission that succeeded.
pub fn scan_and_submit(server: &str, files: Vec<PathBuf>, metrics: &Arc<ScanMetrics>) {
    metrics.record_files_found(files.len() as u64);
    info!(files = files.len(), "submitting file histograms");

    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let server = server.to_string();
            let metrics = Arc::clone(metrics);

            thread::spawn(move || {
                info!(path = %path.display(), "in progress");

                match submit_file(&server, &path) {
                    Ok(bytes) => {
                        metrics.record_submission(bytes);
                        info!(path = %path.display(), bytes, "completed");
                    }
                    Err(e) => {
                        metrics.record_failure();
                        warn!(path = %path.display(), error = %e, "submission failed");
                    }
                }
            })
        })
        .collect();

    // Join barrier: the final GET must not race any submission attempt.
    for handle in handles {
        if handle.join().is_err() {
            warn!("submission worker panicked");
        }
    }
}
