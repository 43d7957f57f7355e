use crate::{board::Position, types::*};

/// Centipawn value used for material counting and capture ordering.
pub fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 0,
    }
}

/// Material balance from the side to move's point of view.
pub fn evaluate(pos: &Position) -> i32 {
    let white: i32 = pos
        .board
        .iter()
        .flatten()
        .map(|pc| match pc.color {
            Color::White => piece_value(pc.kind),
            Color::Black => -piece_value(pc.kind),
        })
        .sum();
    match pos.side_to_move {
        Color::White => white,
        Color::Black => -white,
    }
}
