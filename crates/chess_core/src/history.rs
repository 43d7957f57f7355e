use crate::board::Position;
use crate::detail::MoveDetail;
use crate::error::{PositionError, Result};
use crate::san::parse_san;
use crate::uci::parse_uci_move;

/// Moves played to reach a position, kept in both notations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveHistory {
    san: Vec<String>,
    uci: Vec<String>,
    /// Key of the position before each move.
    hashes: Vec<u64>,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays `moves` from `start`. Each token may be SAN or UCI.
    /// Returns the reached position together with the history.
    pub fn replay<'a, I>(start: &Position, moves: I) -> Result<(Position, MoveHistory)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut pos = start.clone();
        let mut history = MoveHistory::new();
        for (ply, text) in moves.into_iter().enumerate() {
            let detail = parse_uci_move(&pos, text)
                .or_else(|| parse_san(&pos, text))
                .and_then(|mv| pos.detail(mv))
                .ok_or_else(|| PositionError::InvalidMove {
                    text: text.to_string(),
                    ply,
                })?;
            history.push(&pos, &detail);
            pos = detail.after;
        }
        Ok((pos, history))
    }

    pub fn push(&mut self, before: &Position, detail: &MoveDetail) {
        self.san.push(detail.san.clone());
        self.uci.push(detail.uci.clone());
        self.hashes.push(before.position_hash());
    }

    pub fn pop(&mut self) -> Option<(String, String)> {
        self.hashes.pop();
        Some((self.san.pop()?, self.uci.pop()?))
    }

    pub fn len(&self) -> usize {
        self.san.len()
    }

    pub fn is_empty(&self) -> bool {
        self.san.is_empty()
    }

    pub fn san(&self) -> &[String] {
        &self.san
    }

    pub fn uci(&self) -> &[String] {
        &self.uci
    }

    /// Position keys before each move, oldest first.
    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod history_tests;
