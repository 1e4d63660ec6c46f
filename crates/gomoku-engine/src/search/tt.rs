//! Transposition table for negamax, keyed by Zobrist hash.

use rustc_hash::FxHashMap;

/// Score returned by a cancelled search. Never stored.
pub const ABORTED: i32 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    value: i32,
    depth: i32,
}

/// Maps a position hash to the value found at some remaining depth.
///
/// An entry answers a probe only if it was searched at least as deep as
/// requested.
#[derive(Debug, Default, Clone)]
pub struct TranspositionTable {
    entries: FxHashMap<u64, Entry>,
}

impl TranspositionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `hash`, accepting entries at least `depth` deep.
    pub fn probe(&self, hash: u64, depth: i32) -> Option<i32> {
        self.entries
            .get(&hash)
            .filter(|entry| entry.depth >= depth)
            .map(|entry| entry.value)
    }

    /// Record `value` for `hash`, skipping cancellation sentinels.
    pub fn store(&mut self, hash: u64, value: i32, depth: i32) {
        if value.abs() == ABORTED {
            return;
        }
        self.entries.insert(hash, Entry { value, depth });
    }

    /// Number of stored positions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_requires_enough_depth() {
        let mut tt = TranspositionTable::new();
        tt.store(42, 1234, 3);
        assert_eq!(tt.probe(42, 3), Some(1234));
        assert_eq!(tt.probe(42, 2), Some(1234));
        assert_eq!(tt.probe(42, 4), None, "shallower entry must not answer deeper probe");
    }

    #[test]
    fn aborted_scores_are_never_stored() {
        let mut tt = TranspositionTable::new();
        tt.store(1, ABORTED, 9);
        tt.store(2, -ABORTED, 9);
        assert!(tt.is_empty());
        assert_eq!(tt.probe(1, 0), None);
    }

    #[test]
    fn later_store_replaces_entry() {
        let mut tt = TranspositionTable::new();
        tt.store(7, 10, 5);
        tt.store(7, -20, 1);
        assert_eq!(tt.probe(7, 1), Some(-20));
        assert_eq!(tt.len(), 1);
        tt.clear();
        assert!(tt.is_empty());
    }
}
