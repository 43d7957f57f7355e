use std::fmt;

use crate::board::Position;
use crate::movegen::legal_moves;
use crate::san::san_with;
use crate::types::*;
use crate::uci::move_to_uci;

/// A legal move with everything a caller needs to display or replay it.
///
/// Only produced from the legal move list, so holding one proves legality
/// in `before`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveDetail {
    pub mv: Move,
    pub color: Color,
    pub piece: PieceKind,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub san: String,
    pub uci: String,
    /// FEN before the move.
    pub before: String,
    pub after: Position,
}

impl fmt::Display for MoveDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.san)
    }
}

impl Position {
    /// Details for every legal move, in generation order.
    pub fn legal_move_details(&self) -> Vec<MoveDetail> {
        let legal = legal_moves(self);
        let before = self.to_fen();
        legal
            .iter()
            .filter_map(|&mv| self.describe(mv, &legal, &before))
            .collect()
    }

    /// Details for `mv` if it is legal here.
    pub fn detail(&self, mv: Move) -> Option<MoveDetail> {
        let legal = legal_moves(self);
        if !legal.contains(&mv) {
            return None;
        }
        self.describe(mv, &legal, &self.to_fen())
    }

    fn describe(&self, mv: Move, legal: &[Move], before: &str) -> Option<MoveDetail> {
        let piece = self.piece_at(mv.from)?;
        let captured = if mv.is_en_passant {
            Some(PieceKind::Pawn)
        } else {
            self.piece_at(mv.to).map(|p| p.kind)
        };
        Some(MoveDetail {
            mv,
            color: piece.color,
            piece: piece.kind,
            captured,
            promotion: mv.promo,
            san: san_with(self, mv, legal),
            uci: move_to_uci(mv),
            before: before.to_string(),
            after: self.after(mv),
        })
    }
}
