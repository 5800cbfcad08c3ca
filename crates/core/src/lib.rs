//! bytestat-core: byte-frequency aggregation over a small TCP protocol
//!
//! This library provides the core of a system that computes byte-value
//! frequency histograms over files, reports them to a central
//! aggregator, and reads back the running global total:
//! - the wire protocol (operation codes, JSON histogram bodies,
//!   length-free message framing)
//! - the concurrent-safe aggregate store
//! - the server-side request dispatcher
//! - the client-side scan fan-out
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `histogram`: per-file byte-value counts (the domain model)
//! - `codec`: request/response and histogram wire encoding
//! - `framing`: one message per connection, no length prefix
//! - `store`: mutex-guarded running total with consistent snapshots
//! - `report`: count-sorted presentation of a snapshot
//! - `server`: accept loop, per-connection dispatch, submission sink
//! - `client`: per-file worker threads, join barrier, aggregate fetch
//! - `metrics`: counters for a scan run
//!
//! # Design Principles
//!
//! - **No panics**: all fallible paths return structured errors
//! - **Contained failures**: one file or one connection failing never
//!   takes down the run or the aggregator
//! - **Single-lock aggregation**: one mutex over the whole total map,
//!   so merges are atomic with respect to snapshots

pub mod client;
pub mod codec;
pub mod error;
pub mod framing;
pub mod histogram;
pub mod metrics;
pub mod report;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use error::{DecodeError, Error, Result};
pub use histogram::ByteHistogram;
pub use report::SortedReport;
pub use server::{Dispatcher, NullSink, SubmissionSink};
pub use store::AggregateStore;
