//! Presentation-order view of an aggregate snapshot.
//!
//! A [`SortedReport`] is built once from a histogram and never mutated:
//! two parallel sequences (byte value, count) ordered ascending by
//! count. Ties keep byte-value order because the sort is stable over
//! the histogram's ordered iteration.

use crate::codec::byte_token;
use crate::histogram::ByteHistogram;

/// Byte values and counts sorted ascending by count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedReport {
    keys: Vec<u8>,
    counts: Vec<u64>,
}

impl SortedReport {
    /// Build a report from a snapshot.
    ///
    /// Every byte value present in the snapshot appears exactly once.
    pub fn from_histogram(histogram: &ByteHistogram) -> Self {
        let mut pairs: Vec<(u8, u64)> = histogram.iter().collect();
        pairs.sort_by_key(|&(_, count)| count);

        let keys = pairs.iter().map(|&(byte, _)| byte).collect();
        let counts = pairs.iter().map(|&(_, count)| count).collect();
        Self { keys, counts }
    }

    /// Iterate (byte value, count) pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.keys
            .iter()
            .zip(self.counts.iter())
            .map(|(&byte, &count)| (byte, count))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if the source snapshot had no entries.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Render each entry as a `"0x%x count"` line.
    pub fn lines(&self) -> Vec<String> {
        self.iter()
            .map(|(byte, count)| format!("{} {}", byte_token(byte), count))
            .collect()
    }
}
