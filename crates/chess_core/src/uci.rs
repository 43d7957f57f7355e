use crate::board::Position;
use crate::error::Result;
use crate::history::MoveHistory;
use crate::movegen::legal_moves;
use crate::types::*;

pub fn move_to_uci(mv: Move) -> String {
    let mut s = String::with_capacity(5);
    s.push_str(&sq_to_coord(mv.from));
    s.push_str(&sq_to_coord(mv.to));
    if let Some(p) = mv.promo {
        s.push(p.letter());
    }
    s
}

/// Resolves long-algebraic text against the legal moves so castle and
/// en-passant flags come out right. A promotion move needs its suffix.
pub fn parse_uci_move(pos: &Position, txt: &str) -> Option<Move> {
    let txt = txt.trim();
    if !(4..=5).contains(&txt.len()) || !txt.is_ascii() {
        return None;
    }
    let from = coord_to_sq(&txt[0..2])?;
    let to = coord_to_sq(&txt[2..4])?;
    let promo = match txt.chars().nth(4) {
        Some(ch) => Some(PieceKind::from_letter(ch).filter(|k| PieceKind::PROMOTIONS.contains(k))?),
        None => None,
    };

    legal_moves(pos)
        .into_iter()
        .find(|m| m.from == from && m.to == to && m.promo == promo)
}

/// Applies the arguments of a UCI `position` command:
/// `startpos [moves ...]` or `fen <fields> [moves ...]`.
pub fn position_from_uci_args(args: &[&str]) -> Result<(Position, MoveHistory)> {
    let moves_at = args.iter().position(|&a| a == "moves");
    let (setup, moves) = match moves_at {
        Some(i) => (&args[..i], &args[i + 1..]),
        None => (args, &args[args.len()..]),
    };

    let start = match setup.split_first() {
        Some((&"fen", fields)) => Position::from_fen(&fields.join(" "))?,
        _ => Position::startpos(),
    };
    MoveHistory::replay(&start, moves.iter().copied())
}
