//! Transposition table keyed by Zobrist hash.

use std::collections::HashMap;

use crate::MATE_SCORE;

/// How a stored score relates to the true value of the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// Fail-high: the true score is at least this.
    Lower,
    /// Fail-low: the true score is at most this.
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtEntry {
    pub score: i32,
    pub depth: u8,
    pub bound: Bound,
}

/// Lives for one top-level search.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<u64, TtEntry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `key` if it was searched at least `depth` plies deep.
    /// The score is converted back to be relative to `ply`.
    pub fn probe(&self, key: u64, depth: u8, ply: u8) -> Option<TtEntry> {
        let entry = self.entries.get(&key)?;
        (entry.depth >= depth).then(|| TtEntry {
            score: mate_from_table(entry.score, ply),
            ..*entry
        })
    }

    /// Stores or overwrites the entry for `key`.
    pub fn store(&mut self, key: u64, score: i32, depth: u8, bound: Bound, ply: u8) {
        self.entries.insert(
            key,
            TtEntry {
                score: mate_to_table(score, ply),
                depth,
                bound,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_mate(score: i32) -> bool {
    score.abs() > MATE_SCORE - crate::MAX_SEARCH_DEPTH as i32 - 1
}

/// Mate scores are stored as distance from the node, not from the root.
fn mate_to_table(score: i32, ply: u8) -> i32 {
    if !is_mate(score) {
        score
    } else if score > 0 {
        score + ply as i32
    } else {
        score - ply as i32
    }
}

fn mate_from_table(score: i32, ply: u8) -> i32 {
    if !is_mate(score) {
        score
    } else if score > 0 {
        score - ply as i32
    } else {
        score + ply as i32
    }
}
