//! Thread-safe accumulation of histograms into one running total.
//!
//! The store owns the only shared mutable state in the system: the
//! global byte→count map. All access goes through [`AggregateStore::merge`]
//! and [`AggregateStore::snapshot`], both of which take the single mutex
//! covering the whole map.
//!
//! # Locking Discipline
//!
//! One lock over the entire map, not per key: any writer can introduce
//! new keys, so per-key locking could not make an incoming histogram's
//! merge atomic. A merge is therefore all-or-nothing with respect to
//! concurrent snapshots, and no concurrent merges can lose an update.
//!
//! # Capacity
//!
//! No eviction and no capacity bound. Keys are byte values, so the map
//! holds at most 256 entries in practice; that bound comes from the
//! domain, not from this code, and would not survive generalizing the
//! payload format to wider keys.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::histogram::ByteHistogram;

/// The running global histogram, safe for unbounded concurrent callers.
///
/// Created empty at process start, merged into for the process
/// lifetime, discarded on exit. Nothing is persisted here; durable
/// recording of individual submissions belongs to the storage
/// collaborator.
#[derive(Debug, Default)]
pub struct AggregateStore {
    totals: Mutex<BTreeMap<u8, u64>>,
}

impl AggregateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one histogram into the running total.
    ///
    /// For every (byte value, count) pair, adds `count` to the total for
    /// that byte value, creating the entry if absent. The whole merge
    /// happens under the map lock: a concurrent [`snapshot`] observes
    /// either all of it or none of it.
    ///
    /// [`snapshot`]: AggregateStore::snapshot
    pub fn merge(&self, histogram: &ByteHistogram) {
        let mut totals = self.totals.lock();
        for (byte, count) in histogram.iter() {
            *totals.entry(byte).or_insert(0) += count;
        }
    }

    /// Return a consistent copy of the current totals.
    ///
    /// The copy reflects some point between the start and end of the
    /// call; merges that complete before the call are always included.
    /// The snapshot's source path is empty.
    pub fn snapshot(&self) -> ByteHistogram {
        let totals = self.totals.lock();
        let mut snapshot = ByteHistogram::new("");
        for (&byte, &count) in totals.iter() {
            snapshot.insert(byte, count);
        }
        snapshot
    }
}
