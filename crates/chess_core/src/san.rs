//! Standard Algebraic Notation.

use crate::board::Position;
use crate::movegen::legal_moves;
use crate::types::*;

/// SAN for a legal `mv`, including the `+`/`#` suffix.
pub fn move_to_san(pos: &Position, mv: Move) -> String {
    let legal = legal_moves(pos);
    san_with(pos, mv, &legal)
}

/// Same as [`move_to_san`] with the legal move list already at hand.
pub(crate) fn san_with(pos: &Position, mv: Move, legal: &[Move]) -> String {
    let mut out = san_body(pos, mv, legal);
    let next = pos.after(mv);
    if next.in_check(next.side_to_move) {
        out.push(if legal_moves(&next).is_empty() { '#' } else { '+' });
    }
    out
}

fn san_body(pos: &Position, mv: Move, legal: &[Move]) -> String {
    if mv.is_castle {
        return if file_of(mv.to) == 6 { "O-O" } else { "O-O-O" }.to_string();
    }
    let Some(piece) = pos.piece_at(mv.from) else {
        return String::new();
    };
    let capture = mv.is_en_passant || pos.piece_at(mv.to).is_some();
    let mut out = String::with_capacity(8);

    if piece.kind == PieceKind::Pawn {
        if capture {
            out.push(file_char(mv.from));
        }
    } else {
        out.push(piece.kind.letter().to_ascii_uppercase());
        let rivals: Vec<u8> = legal
            .iter()
            .filter(|m| {
                m.to == mv.to
                    && m.from != mv.from
                    && pos.piece_at(m.from).map(|p| p.kind) == Some(piece.kind)
            })
            .map(|m| m.from)
            .collect();
        if !rivals.is_empty() {
            let same_file = rivals.iter().any(|&s| file_of(s) == file_of(mv.from));
            let same_rank = rivals.iter().any(|&s| rank_of(s) == rank_of(mv.from));
            if !same_file {
                out.push(file_char(mv.from));
            } else if !same_rank {
                out.push(rank_char(mv.from));
            } else {
                out.push(file_char(mv.from));
                out.push(rank_char(mv.from));
            }
        }
    }

    if capture {
        out.push('x');
    }
    out.push_str(&sq_to_coord(mv.to));
    if let Some(kind) = mv.promo {
        out.push('=');
        out.push(kind.letter().to_ascii_uppercase());
    }
    out
}

/// Finds the legal move written as `text`. Check marks, annotations, a missing
/// `=` before the promotion piece and `0-0` style castling are tolerated.
pub fn parse_san(pos: &Position, text: &str) -> Option<Move> {
    let wanted = normalize(text);
    if wanted.is_empty() {
        return None;
    }
    let legal = legal_moves(pos);
    legal
        .iter()
        .copied()
        .find(|&mv| normalize(&san_body(pos, mv, &legal)) == wanted)
}

fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches(['+', '#', '!', '?'])
        .replace("0-0-0", "O-O-O")
        .replace("0-0", "O-O")
        .replace('=', "")
}

fn file_char(square: u8) -> char {
    char::from(b'a' + file_of(square) as u8)
}

fn rank_char(square: u8) -> char {
    char::from(b'1' + rank_of(square) as u8)
}

#[cfg(test)]
#[path = "san_tests.rs"]
mod san_tests;
