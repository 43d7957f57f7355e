//! Negamax search with alpha-beta pruning and a transposition table.

use std::time::Instant;

use chess_core::{legal_moves, Move, MoveDetail, MoveHistory, Position};

use crate::error::{Result, SearchError};
use crate::eval::Evaluator;
use crate::tt::{Bound, TranspositionTable};
use crate::{SearchConfig, SearchOutcome, MATE_SCORE, MAX_SEARCH_DEPTH};

const INFINITY: i32 = MATE_SCORE + 1;

/// Bounded-depth searcher. Each call to [`SearchCore::search`] starts with an
/// empty transposition table.
pub struct SearchCore<E> {
    evaluator: E,
    config: SearchConfig,
}

impl<E: Evaluator> SearchCore<E> {
    pub fn new(evaluator: E, config: SearchConfig) -> Self {
        Self { evaluator, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Searches `pos`, reached through `history`, to the configured depth.
    ///
    /// Depth 0 scores the root without expanding it, so no move is returned.
    pub fn search(&self, pos: &Position, history: &MoveHistory) -> Result<SearchOutcome> {
        let depth = self.config.depth;
        if depth > MAX_SEARCH_DEPTH {
            return Err(SearchError::DepthLimit {
                requested: depth,
                max: MAX_SEARCH_DEPTH,
            });
        }

        let started = Instant::now();
        let mut path: Vec<u64> = history.hashes().to_vec();
        path.push(pos.position_hash());
        let mut run = Run {
            evaluator: &self.evaluator,
            max_moves: self.config.max_moves,
            tt: TranspositionTable::new(),
            path,
            nodes: 0,
            tt_hits: 0,
        };
        let (score, best) = run.root(pos, history, depth)?;

        let best_move = match best {
            Some(mv) => pos.detail(mv),
            None => None,
        };
        tracing::debug!(
            depth,
            score,
            nodes = run.nodes,
            tt_hits = run.tt_hits,
            best = best_move.as_ref().map(|d| d.uci.as_str()),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );
        Ok(SearchOutcome {
            best_move,
            score,
            depth,
            nodes: run.nodes,
            tt_hits: run.tt_hits,
        })
    }
}

/// State of one top-level search.
struct Run<'a, E> {
    evaluator: &'a E,
    max_moves: Option<usize>,
    tt: TranspositionTable,
    /// Keys of the game so far plus the current search path, for repetition.
    path: Vec<u64>,
    nodes: u64,
    tt_hits: u64,
}

impl<E: Evaluator> Run<'_, E> {
    fn root(&mut self, pos: &Position, history: &MoveHistory, depth: u8) -> Result<(i32, Option<Move>)> {
        self.nodes += 1;
        let moves = legal_moves(pos);
        if moves.is_empty() {
            return Ok((terminal_score(pos, 0), None));
        }
        if depth == 0 {
            return Ok((self.evaluator.evaluate(pos, history)?, None));
        }

        let mut alpha = -INFINITY;
        let mut best: Option<(i32, Move)> = None;
        for mv in self.ordered(pos, history, moves)? {
            let score = -self.child(pos, history, mv, depth - 1, 1, -INFINITY, -alpha)?;
            // Strict comparison keeps the earlier move on ties.
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, mv));
            }
            alpha = alpha.max(score);
        }
        Ok(match best {
            Some((score, mv)) => (score, Some(mv)),
            None => (terminal_score(pos, 0), None),
        })
    }

    /// Plays `mv` and searches the resulting node.
    #[allow(clippy::too_many_arguments)]
    fn child(
        &mut self,
        pos: &Position,
        history: &MoveHistory,
        mv: Move,
        depth: u8,
        ply: u8,
        alpha: i32,
        beta: i32,
    ) -> Result<i32> {
        let next = pos.after(mv);
        let extended;
        let next_history = if self.evaluator.needs_history() {
            let mut h = history.clone();
            if let Some(detail) = pos.detail(mv) {
                h.push(pos, &detail);
            }
            extended = h;
            &extended
        } else {
            history
        };

        self.path.push(next.position_hash());
        let score = self.negamax(&next, next_history, depth, ply, alpha, beta);
        self.path.pop();
        score
    }

    fn negamax(
        &mut self,
        pos: &Position,
        history: &MoveHistory,
        depth: u8,
        ply: u8,
        mut alpha: i32,
        mut beta: i32,
    ) -> Result<i32> {
        self.nodes += 1;

        if pos.is_fifty_move_draw() || pos.is_insufficient_material() || self.is_repetition() {
            return Ok(0);
        }

        let key = pos.position_hash();
        if let Some(entry) = self.tt.probe(key, depth, ply) {
            self.tt_hits += 1;
            match entry.bound {
                Bound::Exact => return Ok(entry.score),
                Bound::Lower => alpha = alpha.max(entry.score),
                Bound::Upper => beta = beta.min(entry.score),
            }
            if alpha >= beta {
                return Ok(entry.score);
            }
        }

        let moves = legal_moves(pos);
        if moves.is_empty() {
            return Ok(terminal_score(pos, ply));
        }
        if depth == 0 {
            return self.evaluator.evaluate(pos, history);
        }

        let alpha_start = alpha;
        let mut best = -INFINITY;
        for mv in self.ordered(pos, history, moves)? {
            let score = -self.child(pos, history, mv, depth - 1, ply + 1, -beta, -alpha)?;
            if score > best {
                best = score;
            }
            if best > alpha {
                alpha = best;
            }
            if alpha >= beta {
                break;
            }
        }

        let bound = if best <= alpha_start {
            Bound::Upper
        } else if best >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(key, best, depth, bound, ply);
        Ok(best)
    }

    /// Moves sorted by evaluator score, best first, cut to `max_moves`.
    fn ordered(&self, pos: &Position, history: &MoveHistory, moves: Vec<Move>) -> Result<Vec<Move>> {
        let scores = self.evaluator.order(pos, history, &moves)?;
        let mut scored: Vec<(f32, Move)> = scores.into_iter().zip(moves).collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        if let Some(limit) = self.max_moves {
            scored.truncate(limit.max(1));
        }
        Ok(scored.into_iter().map(|(_, mv)| mv).collect())
    }

    fn is_repetition(&self) -> bool {
        let Some(&current) = self.path.last() else {
            return false;
        };
        self.path.iter().filter(|&&k| k == current).count() >= 3
    }
}

/// Score of a node without legal moves: mated, or stalemate.
fn terminal_score(pos: &Position, ply: u8) -> i32 {
    if pos.in_check(pos.side_to_move) {
        -(MATE_SCORE - ply as i32)
    } else {
        0
    }
}

/// Convenience for callers that only need the chosen move.
pub fn best_move<E: Evaluator>(
    evaluator: E,
    config: SearchConfig,
    pos: &Position,
    history: &MoveHistory,
) -> Result<Option<MoveDetail>> {
    Ok(SearchCore::new(evaluator, config)
        .search(pos, history)?
        .best_move)
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
