//! Key comparators.
//!
//! A table never orders keys itself; it stores the comparator it was opened
//! with and hands it to every decoded block so the block can search its
//! entries.

use std::cmp::Ordering;
use std::fmt::Debug;

/// A total order over keys.
pub trait Comparator: Send + Sync + Debug {
    /// Name persisted alongside tables written with this order
    fn name(&self) -> &str;

    /// Compare two keys
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;
}

/// Lexicographic byte order, the default LevelDB comparator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytewiseComparator;

impl Comparator for BytewiseComparator {
    fn name(&self) -> &str {
        "leveldb.BytewiseComparator"
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}
