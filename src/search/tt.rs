//! Transposition Table for caching search results
//!
//! The transposition table stores search results indexed by board hash,
//! enabling reuse of previous search results for positions we've seen before.
//!
//! # Example
//!
//! ```
//! use fanorona::search::{EntryType, TranspositionTable};
//!
//! let mut tt = TranspositionTable::new(1).expect("1 MB table"); // 1 MB
//!
//! // Store a search result
//! let hash = 0x123456789ABCDEF0;
//! tt.store(hash, 4, 100, EntryType::Exact, None);
//!
//! // Probe for the result
//! if let Some(entry) = tt.probe(hash) {
//!     println!("Found cached result: score={}, depth={}", entry.score, entry.depth);
//! }
//! ```

use crate::board::Move;
use crate::error::TableError;

/// Entry type for score interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Exact score - the search completed inside the window
    Exact,
    /// Lower bound - score >= stored value (beta cutoff)
    LowerBound,
    /// Upper bound - score <= stored value (alpha fail-low)
    UpperBound,
}

/// Transposition table entry
#[derive(Debug, Clone)]
pub struct TTEntry {
    /// Zobrist hash of the position
    pub hash: u64,
    /// Search depth for this entry
    pub depth: i8,
    /// Evaluation score
    pub score: i32,
    /// Type of score (exact, lower bound, upper bound)
    pub entry_type: EntryType,
    /// Best move found for this position
    pub best_move: Option<Move>,
}

/// Transposition table for caching search results.
///
/// Direct-mapped: each hash maps to exactly one slot and a store always
/// overwrites it. Entries carry their full hash, so a probe never returns
/// another position's result; collisions only cost a miss.
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    size: usize,
}

impl TranspositionTable {
    /// Create a table of roughly `size_mb` megabytes (at least 1024 slots).
    ///
    /// Fails instead of aborting when the allocation cannot be satisfied.
    pub fn new(size_mb: usize) -> Result<Self, TableError> {
        let entry_size = std::mem::size_of::<Option<TTEntry>>();
        let size = (size_mb.saturating_mul(1024 * 1024) / entry_size).max(1024);

        let mut entries = Vec::new();
        entries
            .try_reserve_exact(size)
            .map_err(|_| TableError::Allocation { size_mb, slots: size })?;
        entries.resize(size, None);

        Ok(Self { entries, size })
    }

    #[inline]
    fn slot(&self, hash: u64) -> usize {
        (hash % self.size as u64) as usize
    }

    /// Look up a position. Returns the entry only on exact hash equality.
    #[must_use]
    pub fn probe(&self, hash: u64) -> Option<&TTEntry> {
        self.entries[self.slot(hash)]
            .as_ref()
            .filter(|entry| entry.hash == hash)
    }

    /// Score usable at `depth`: an exact entry searched at least as deep.
    #[must_use]
    pub fn probe_exact(&self, hash: u64, depth: i8) -> Option<i32> {
        self.probe(hash)
            .filter(|e| e.entry_type == EntryType::Exact && e.depth >= depth)
            .map(|e| e.score)
    }

    /// Best move from a previous search, for move ordering.
    #[must_use]
    pub fn get_best_move(&self, hash: u64) -> Option<&Move> {
        self.probe(hash).and_then(|e| e.best_move.as_ref())
    }

    /// Store a result, overwriting whatever occupied the slot.
    pub fn store(
        &mut self,
        hash: u64,
        depth: i8,
        score: i32,
        entry_type: EntryType,
        best_move: Option<Move>,
    ) {
        let idx = self.slot(hash);
        self.entries[idx] = Some(TTEntry {
            hash,
            depth,
            score,
            entry_type,
            best_move,
        });
    }

    /// Clear all entries in the table.
    ///
    /// This should be called when starting a new game or when the
    /// table becomes stale.
    pub fn clear(&mut self) {
        self.entries.fill(None);
    }

    /// Number of slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Get statistics about table usage.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        let used = self.entries.iter().filter(|e| e.is_some()).count();
        TTStats {
            size: self.size,
            used,
            usage_percent: (used as f64 / self.size as f64 * 100.0) as u8,
        }
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TTStats {
    /// Total number of slots in the table
    pub size: usize,
    /// Number of slots currently occupied
    pub used: usize,
    /// Percentage of table in use (0-100)
    pub usage_percent: u8,
}
