//! Integration tests for the full submit/aggregate pipeline.
//!
//! These tests run the real dispatcher on a loopback listener and drive
//! it with real client connections: submit histograms, fetch the
//! aggregate, and verify the protocol's failure behavior (malformed
//! payloads, unknown operations, silence-as-error).

use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use bytestat_core::client::{fetch_aggregate, scan_and_submit, submit};
use bytestat_core::codec::{OP_ADD, OP_GET};
use bytestat_core::metrics::ScanMetrics;
use bytestat_core::{
    AggregateStore, ByteHistogram, Dispatcher, NullSink, Result, SortedReport, SubmissionSink,
};

/// Start a dispatcher on an ephemeral loopback port.
///
/// Returns the address to dial and the store, for asserting on server
/// state directly. The serve thread is detached; it dies with the test
/// process.
fn start_server(sink: Arc<dyn SubmissionSink>) -> (String, Arc<AggregateStore>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr").to_string();

    let store = Arc::new(AggregateStore::new());
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&store), sink));

    std::thread::spawn(move || dispatcher.serve(listener));

    (addr, store)
}

/// Write raw request bytes and read whatever comes back.
fn raw_exchange(addr: &str, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream.write_all(request).expect("write");
    stream.shutdown(Shutdown::Write).expect("half-close");

    let mut response = Vec::new();
    stream.read_to_end(&mut response).expect("read");
    response
}

fn histogram(source: &str, pairs: &[(u8, u64)]) -> ByteHistogram {
    let mut h = ByteHistogram::new(source);
    for &(byte, count) in pairs {
        h.insert(byte, count);
    }
    h
}

#[test]
fn test_get_before_any_add_is_empty() {
    let (addr, _store) = start_server(Arc::new(NullSink));

    let snapshot = fetch_aggregate(&addr).expect("fetch");
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.source, "");
}

#[test]
fn test_add_then_get_accumulates() {
    let (addr, _store) = start_server(Arc::new(NullSink));

    submit(&addr, &histogram("a", &[(0x00, 3)])).expect("first submit");
    submit(&addr, &histogram("b", &[(0x00, 2), (0x01, 1)])).expect("second submit");

    let snapshot = fetch_aggregate(&addr).expect("fetch");
    assert_eq!(snapshot.get(0x00), 5);
    assert_eq!(snapshot.get(0x01), 1);
    assert_eq!(snapshot.len(), 2);
}

#[test]
fn test_concurrent_submissions_sum_exactly() {
    let (addr, _store) = start_server(Arc::new(NullSink));

    // Deterministic buffers; expected totals computed independently.
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let buffers: Vec<Vec<u8>> = (0..32)
        .map(|_| (0..rng.gen_range(1..2048)).map(|_| rng.gen()).collect())
        .collect();

    let mut expected = [0u64; 256];
    for buffer in &buffers {
        for &byte in buffer {
            expected[byte as usize] += 1;
        }
    }

    let handles: Vec<_> = buffers
        .into_iter()
        .enumerate()
        .map(|(i, buffer)| {
            let addr = addr.clone();
            std::thread::spawn(move || {
                let h = ByteHistogram::from_bytes(format!("buffer-{i}"), &buffer);
                submit(&addr, &h).expect("submit");
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker");
    }

    let snapshot = fetch_aggregate(&addr).expect("fetch");
    for (byte, want) in expected.iter().enumerate() {
        assert_eq!(snapshot.get(byte as u8), *want, "byte {byte:#x}");
    }
}

#[test]
fn test_malformed_add_leaves_store_unchanged() {
    let (addr, store) = start_server(Arc::new(NullSink));

    submit(&addr, &histogram("ok", &[(0x10, 4)])).expect("submit");

    // Truncated JSON body after the ADD opcode.
    let mut request = vec![OP_ADD];
    request.extend_from_slice(br#"{"filePath":"bad","statistics":{"0x41""#);
    let response = raw_exchange(&addr, &request);

    // Closed without responding, and nothing was merged.
    assert!(response.is_empty());
    let snapshot = store.snapshot();
    assert_eq!(snapshot.get(0x10), 4);
    assert_eq!(snapshot.len(), 1);
}

#[test]
fn test_unknown_operation_closes_silently() {
    let (addr, store) = start_server(Arc::new(NullSink));

    let response = raw_exchange(&addr, &[0x7F, 0x01, 0x02]);
    assert!(response.is_empty());
    assert!(store.snapshot().is_empty());
}

#[test]
fn test_empty_request_closes_silently() {
    let (addr, _store) = start_server(Arc::new(NullSink));

    let response = raw_exchange(&addr, &[]);
    assert!(response.is_empty());
}

#[test]
fn test_get_response_is_bare_json() {
    let (addr, _store) = start_server(Arc::new(NullSink));

    submit(&addr, &histogram("a", &[(0x41, 2), (0x42, 1)])).expect("submit");

    let response = raw_exchange(&addr, &[OP_GET]);
    let text = String::from_utf8(response).expect("utf8");
    assert_eq!(
        text,
        r#"{"filePath":"","statistics":{"0x41":2,"0x42":1}}"#
    );
}

/// Sink that records what it was handed, for asserting the dispatcher's
/// fire-and-forget persistence call.
struct RecordingSink {
    seen: parking_lot::Mutex<Vec<String>>,
}

impl SubmissionSink for RecordingSink {
    fn record(&self, histogram: &ByteHistogram) -> Result<()> {
        self.seen.lock().push(histogram.source.clone());
        Ok(())
    }
}

/// Sink that always fails, for asserting failures never reach clients.
struct FailingSink;

impl SubmissionSink for FailingSink {
    fn record(&self, _histogram: &ByteHistogram) -> Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "journal down").into())
    }
}

#[test]
fn test_submissions_reach_the_sink() {
    let sink = Arc::new(RecordingSink {
        seen: parking_lot::Mutex::new(Vec::new()),
    });
    let (addr, _store) = start_server(Arc::clone(&sink) as Arc<dyn SubmissionSink>);

    submit(&addr, &histogram("first.bin", &[(0x01, 1)])).expect("submit");
    submit(&addr, &histogram("second.bin", &[(0x02, 2)])).expect("submit");
    // GET never touches the sink.
    fetch_aggregate(&addr).expect("fetch");

    let mut seen = sink.seen.lock().clone();
    seen.sort();
    assert_eq!(seen, vec!["first.bin", "second.bin"]);
}

#[test]
fn test_sink_failure_does_not_fail_the_merge() {
    let (addr, store) = start_server(Arc::new(FailingSink));

    // The submit still succeeds (clean close) and the merge still lands.
    submit(&addr, &histogram("doomed", &[(0x33, 3)])).expect("submit");
    assert_eq!(store.snapshot().get(0x33), 3);
}

#[test]
fn test_scan_directory_end_to_end() {
    let (addr, _store) = start_server(Arc::new(NullSink));

    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("ab.bin"), [0x41, 0x41, 0x42]).expect("write");
    std::fs::write(dir.path().join("more.bin"), [0x42, 0x43]).expect("write");
    std::fs::write(dir.path().join("empty.bin"), []).expect("write");

    let files: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .expect("read_dir")
        .map(|entry| entry.expect("entry").path())
        .collect();

    let metrics = Arc::new(ScanMetrics::new());
    scan_and_submit(&addr, files, &metrics);

    assert_eq!(metrics.files_found(), 3);
    assert_eq!(metrics.submissions_ok(), 3);
    assert_eq!(metrics.submissions_failed(), 0);
    assert_eq!(metrics.bytes_counted(), 5);

    let snapshot = fetch_aggregate(&addr).expect("fetch");
    assert_eq!(snapshot.get(0x41), 2);
    assert_eq!(snapshot.get(0x42), 2);
    assert_eq!(snapshot.get(0x43), 1);

    let report = SortedReport::from_histogram(&snapshot);
    let counts: Vec<u64> = report.iter().map(|(_, count)| count).collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(report.len(), snapshot.len());
}

#[test]
fn test_unreadable_file_is_skipped_not_fatal() {
    let (addr, _store) = start_server(Arc::new(NullSink));

    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("good.bin"), [0x11, 0x11]).expect("write");

    let files = vec![
        dir.path().join("good.bin"),
        dir.path().join("does-not-exist.bin"),
    ];

    let metrics = Arc::new(ScanMetrics::new());
    scan_and_submit(&addr, files, &metrics);

    assert_eq!(metrics.submissions_ok(), 1);
    assert_eq!(metrics.submissions_failed(), 1);

    let snapshot = fetch_aggregate(&addr).expect("fetch");
    assert_eq!(snapshot.get(0x11), 2);
    assert_eq!(snapshot.len(), 1);
}
