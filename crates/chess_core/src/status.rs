use crate::board::Position;
use crate::movegen::has_legal_move;
use crate::types::*;

/// Outcome of a position with respect to the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        self != GameStatus::Ongoing
    }
}

impl Position {
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Bare kings, a single minor piece, or bishops that all stand on one square colour.
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = 0;
        let mut bishop_shades = [false; 2];
        for (idx, pc) in self.board.iter().enumerate() {
            let Some(pc) = pc else { continue };
            match pc.kind {
                PieceKind::King => {}
                PieceKind::Knight => minors += 1,
                PieceKind::Bishop => {
                    let s = idx as u8;
                    bishop_shades[((file_of(s) + rank_of(s)) % 2) as usize] = true;
                    minors += 1;
                }
                _ => return false,
            }
        }
        let knights_present = self
            .board
            .iter()
            .flatten()
            .any(|pc| pc.kind == PieceKind::Knight);
        minors <= 1 || (!knights_present && !(bishop_shades[0] && bishop_shades[1]))
    }

    pub fn status(&self) -> GameStatus {
        if !has_legal_move(self) {
            return if self.in_check(self.side_to_move) {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            };
        }
        if self.is_fifty_move_draw() {
            GameStatus::FiftyMoveRule
        } else if self.is_insufficient_material() {
            GameStatus::InsufficientMaterial
        } else {
            GameStatus::Ongoing
        }
    }
}
