use crate::board::{is_last_rank, Position, DIAGONALS, KING_STEPS, KNIGHT_STEPS, ORTHOGONALS};
use crate::types::*;

/// Generate all legal moves, returning a freshly allocated vector.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut tmp = pos.clone();
    let mut out = Vec::with_capacity(64);
    legal_moves_into(&mut tmp, &mut out);
    out
}

/// Generate all legal moves into the provided buffer, reusing it across calls.
/// `pos` is restored before returning.
pub fn legal_moves_into(pos: &mut Position, out: &mut Vec<Move>) {
    out.clear();
    pseudo_moves(pos, out);

    let mover = pos.side_to_move;
    out.retain(|&mv| {
        let undo = pos.make_move(mv);
        let illegal = pos.in_check(mover);
        pos.unmake_move(mv, undo);
        !illegal
    });
}

/// True if the side to move has at least one legal move.
pub fn has_legal_move(pos: &Position) -> bool {
    !legal_moves(pos).is_empty()
}

fn pseudo_moves(pos: &Position, out: &mut Vec<Move>) {
    let us = pos.side_to_move;
    for from in 0..64u8 {
        let Some(pc) = pos.piece_at(from) else {
            continue;
        };
        if pc.color != us {
            continue;
        }
        match pc.kind {
            PieceKind::Pawn => gen_pawn(pos, from, us, out),
            PieceKind::Knight => gen_steps(pos, from, us, &KNIGHT_STEPS, out),
            PieceKind::Bishop => gen_rays(pos, from, us, &DIAGONALS, out),
            PieceKind::Rook => gen_rays(pos, from, us, &ORTHOGONALS, out),
            PieceKind::Queen => {
                gen_rays(pos, from, us, &DIAGONALS, out);
                gen_rays(pos, from, us, &ORTHOGONALS, out);
            }
            PieceKind::King => {
                gen_steps(pos, from, us, &KING_STEPS, out);
                gen_castles(pos, from, us, out);
            }
        }
    }
}

fn push_pawn_move(from: u8, to: u8, us: Color, out: &mut Vec<Move>) {
    if is_last_rank(us, to) {
        out.extend(
            PieceKind::PROMOTIONS
                .iter()
                .map(|&kind| Move::promoting(from, to, kind)),
        );
    } else {
        out.push(Move::new(from, to));
    }
}

fn gen_pawn(pos: &Position, from: u8, us: Color, out: &mut Vec<Move>) {
    let f = file_of(from);
    let r = rank_of(from);
    let (dir, start_rank) = match us {
        Color::White => (1, 1),
        Color::Black => (-1, 6),
    };

    if let Some(one) = sq(f, r + dir)
        && pos.piece_at(one).is_none()
    {
        push_pawn_move(from, one, us, out);
        if r == start_rank
            && let Some(two) = sq(f, r + 2 * dir)
            && pos.piece_at(two).is_none()
        {
            out.push(Move::new(from, two));
        }
    }

    for df in [-1, 1] {
        let Some(to) = sq(f + df, r + dir) else {
            continue;
        };
        match pos.piece_at(to) {
            Some(target) if target.color != us => push_pawn_move(from, to, us, out),
            None if pos.en_passant == Some(to) => out.push(Move {
                is_en_passant: true,
                ..Move::new(from, to)
            }),
            _ => {}
        }
    }
}

/// Single-step movers: knight and king.
fn gen_steps(pos: &Position, from: u8, us: Color, steps: &[(i8, i8)], out: &mut Vec<Move>) {
    let f = file_of(from);
    let r = rank_of(from);
    for (df, dr) in steps {
        if let Some(to) = sq(f + df, r + dr)
            && pos.piece_at(to).is_none_or(|pc| pc.color != us)
        {
            out.push(Move::new(from, to));
        }
    }
}

fn gen_rays(pos: &Position, from: u8, us: Color, dirs: &[(i8, i8)], out: &mut Vec<Move>) {
    for (df, dr) in dirs {
        let mut f = file_of(from) + df;
        let mut r = rank_of(from) + dr;
        while let Some(to) = sq(f, r) {
            match pos.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(pc) => {
                    if pc.color != us {
                        out.push(Move::new(from, to));
                    }
                    break;
                }
            }
            f += df;
            r += dr;
        }
    }
}

struct CastleLane {
    allowed: bool,
    king_to: u8,
    /// Squares that must be empty.
    empty: &'static [u8],
    /// Squares the king crosses; none may be attacked.
    safe: [u8; 2],
}

fn gen_castles(pos: &Position, from: u8, us: Color, out: &mut Vec<Move>) {
    let c = &pos.castling;
    let (home, lanes) = match us {
        Color::White => (
            4u8,
            [
                CastleLane { allowed: c.wk, king_to: 6, empty: &[5, 6], safe: [5, 6] },
                CastleLane { allowed: c.wq, king_to: 2, empty: &[1, 2, 3], safe: [3, 2] },
            ],
        ),
        Color::Black => (
            60u8,
            [
                CastleLane { allowed: c.bk, king_to: 62, empty: &[61, 62], safe: [61, 62] },
                CastleLane { allowed: c.bq, king_to: 58, empty: &[57, 58, 59], safe: [59, 58] },
            ],
        ),
    };
    if from != home || pos.in_check(us) {
        return;
    }

    let rook = Some(Piece::new(us, PieceKind::Rook));
    let enemy = us.other();
    for lane in lanes {
        let rook_home = if lane.king_to > home { home + 3 } else { home - 4 };
        if lane.allowed
            && pos.piece_at(rook_home) == rook
            && lane.empty.iter().all(|&s| pos.piece_at(s).is_none())
            && lane.safe.iter().all(|&s| !pos.is_square_attacked(s, enemy))
        {
            out.push(Move {
                is_castle: true,
                ..Move::new(from, lane.king_to)
            });
        }
    }
}

#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;
