//! Transposition table for alpha-beta.
//!
//! Keyed by the position's Zobrist hash. Values are stored from the searching
//! agent's perspective, so a table is only valid for one root agent; the
//! search clears it between calls.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::Action;

/// How a stored value relates to the true value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bound {
    Exact,
    /// Failed high: the true value is at least this.
    Lower,
    /// Failed low: the true value is at most this.
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub value: i32,
    /// Remaining depth the value was searched to.
    pub depth: u8,
    pub bound: Bound,
    pub best_move: Option<Action>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TTStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
    /// Stores dropped because the table was full.
    pub rejected: u64,
}

impl TTStats {
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.hits as f64 / self.probes as f64
        }
    }
}

pub trait TranspositionTable {
    fn probe(&mut self, key: u64) -> Option<TTEntry>;
    fn store(&mut self, key: u64, entry: TTEntry);
    fn clear(&mut self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hash map table with depth-preferred replacement and a size cap.
#[derive(Debug)]
pub struct InMemoryTT {
    map: FxHashMap<u64, TTEntry>,
    capacity: usize,
    stats: TTStats,
}

impl InMemoryTT {
    /// Create a table holding at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity.min(1 << 16), Default::default()),
            capacity,
            stats: TTStats::default(),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> TTStats {
        self.stats
    }
}

impl TranspositionTable for InMemoryTT {
    #[inline]
    fn probe(&mut self, key: u64) -> Option<TTEntry> {
        self.stats.probes += 1;
        let entry = self.map.get(&key).copied();
        if entry.is_some() {
            self.stats.hits += 1;
        }
        entry
    }

    fn store(&mut self, key: u64, entry: TTEntry) {
        let full = self.map.len() >= self.capacity;
        match self.map.get_mut(&key) {
            Some(old) => {
                // Depth-preferred: keep the deeper result
                if entry.depth >= old.depth {
                    *old = entry;
                    self.stats.stores += 1;
                }
            }
            None if full => self.stats.rejected += 1,
            None => {
                self.map.insert(key, entry);
                self.stats.stores += 1;
            }
        }
    }

    fn clear(&mut self) {
        self.map.clear();
        self.stats = TTStats::default();
    }

    #[inline]
    fn len(&self) -> usize {
        self.map.len()
    }
}
