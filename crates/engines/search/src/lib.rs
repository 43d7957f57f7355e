//! Search core of the move prediction engine.
//!
//! Negamax with alpha-beta pruning over [`chess_core::Position`] values,
//! memoized in a per-search transposition table. Move ordering and leaf
//! scores come from an [`Evaluator`]: either plain material or the
//! policy/value models held by an [`ml_engine::ModelRegistry`].

mod error;
mod eval;
mod search;
mod tt;

use chess_core::MoveDetail;

pub use error::{Result, SearchError};
pub use eval::{capture_order, Evaluator, MaterialEvaluator, ModelEvaluator};
pub use search::{best_move, SearchCore};
pub use tt::{Bound, TranspositionTable, TtEntry};

/// Deepest search the core accepts.
pub const MAX_SEARCH_DEPTH: u8 = 32;

/// Score of being mated at the root. Mates further away score closer to zero.
pub const MATE_SCORE: i32 = 100_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies below the root.
    pub depth: u8,
    /// Keep only this many of the best-ordered moves at every node.
    pub max_moves: Option<usize>,
}

impl SearchConfig {
    pub fn new(depth: u8) -> Self {
        Self {
            depth,
            max_moves: None,
        }
    }

    pub fn with_max_moves(mut self, max_moves: usize) -> Self {
        self.max_moves = Some(max_moves);
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            max_moves: Some(5),
        }
    }
}

/// Result of one top-level search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// `None` at depth 0 or when the root has no legal move.
    pub best_move: Option<MoveDetail>,
    /// Centipawns from the side to move at the root.
    pub score: i32,
    pub depth: u8,
    pub nodes: u64,
    pub tt_hits: u64,
}

impl SearchOutcome {
    pub fn is_mate_score(&self) -> bool {
        self.score.abs() > MATE_SCORE - MAX_SEARCH_DEPTH as i32 - 1
    }
}
