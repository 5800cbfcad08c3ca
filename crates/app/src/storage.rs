//! Submission journal: durable record of individual submissions.
//!
//! The aggregator's running total lives only in memory; what gets
//! persisted is each accepted submission, appended as one JSON document
//! per line. The journal uses the same document shape as the wire
//! format, so a journal line round-trips through the histogram codec.
//!
//! Journal failures are the sink's to report and the dispatcher's to
//! log; they never reach the submitting client.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use parking_lot::Mutex;

use bytestat_core::codec;
use bytestat_core::{ByteHistogram, Result, SubmissionSink};

/// Append-only JSON-lines journal of accepted submissions.
pub struct JsonlSink {
    // One line per record; the lock keeps concurrent connection
    // threads from interleaving partial lines.
    file: Mutex<File>,
}

impl JsonlSink {
    /// Open (or create) the journal at `path` for appending.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl SubmissionSink for JsonlSink {
    fn record(&self, histogram: &ByteHistogram) -> Result<()> {
        let mut line = codec::encode_histogram(histogram)?;
        line.push(b'\n');

        let mut file = self.file.lock();
        file.write_all(&line)?;
        // Flushed per record: a crash loses at most the line in flight.
        file.flush()?;
        Ok(())
    }
}
