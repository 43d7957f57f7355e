//! Board encoders for the network inputs.
//!
//! Three encodings are in use, one per model generation. All of them walk the
//! board in FEN order: rank 8 first, files a to h.

use chess_core::{Color, PieceKind, Position};
use serde::{Deserialize, Serialize};

use crate::session::InputTensor;

/// Length of the FEN token sequence, side-to-move token included.
pub const FEN_TOKEN_LEN: usize = 65;

/// 12 piece planes plus a side-to-move plane.
pub const NUM_PLANES: usize = 13;

/// Width of the secondary game-state vector.
pub const STATE_FEATURES: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardEncoding {
    /// `[1, 8, 8, 1]`, white pieces positive and black negative.
    SignedSquares,
    /// `[1, 8, 8, 13]` one-hot planes `p r n b q k P R N B Q K` then side to move.
    PiecePlanes,
    /// `[1, 65]` one token per placement character, then side to move.
    FenTokens,
}

impl BoardEncoding {
    pub fn shape(self) -> Vec<usize> {
        match self {
            BoardEncoding::SignedSquares => vec![1, 8, 8, 1],
            BoardEncoding::PiecePlanes => vec![1, 8, 8, NUM_PLANES],
            BoardEncoding::FenTokens => vec![1, FEN_TOKEN_LEN],
        }
    }
}

pub fn encode_board(pos: &Position, encoding: BoardEncoding) -> InputTensor {
    let data = match encoding {
        BoardEncoding::SignedSquares => signed_squares(pos),
        BoardEncoding::PiecePlanes => piece_planes(pos),
        BoardEncoding::FenTokens => fen_tokens(pos),
    };
    InputTensor::new(encoding.shape(), data)
}

/// Side to move, castling `KQkq`, en-passant file, then both clocks scaled to `[0, 1]`.
pub fn encode_state(pos: &Position) -> InputTensor {
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    let c = pos.castling;
    let ep_file = pos
        .en_passant
        .map(|s| f32::from(s % 8 + 1) / 8.0)
        .unwrap_or(0.0);
    let data = vec![
        flag(pos.side_to_move == Color::White),
        flag(c.wk),
        flag(c.wq),
        flag(c.bk),
        flag(c.bq),
        ep_file,
        (pos.halfmove_clock as f32 / 100.0).min(1.0),
        (pos.fullmove_number as f32 / 200.0).min(1.0),
    ];
    InputTensor::new(vec![1, STATE_FEATURES], data)
}

/// Squares in FEN order.
fn fen_order() -> impl Iterator<Item = u8> {
    (0..8u8).rev().flat_map(|rank| (0..8u8).map(move |file| rank * 8 + file))
}

fn side_flag(pos: &Position) -> f32 {
    if pos.side_to_move == Color::White {
        1.0
    } else {
        0.0
    }
}

fn signed_squares(pos: &Position) -> Vec<f32> {
    fen_order()
        .map(|s| match pos.piece_at(s) {
            Some(pc) => {
                let code = pc.kind.idx() as f32 + 1.0;
                match pc.color {
                    Color::White => code,
                    Color::Black => -code,
                }
            }
            None => 0.0,
        })
        .collect()
}

/// Plane index shared by the plane and token encoders: `p r n b q k` then uppercase.
fn plane_of(kind: PieceKind, color: Color) -> usize {
    let base = match kind {
        PieceKind::Pawn => 0,
        PieceKind::Rook => 1,
        PieceKind::Knight => 2,
        PieceKind::Bishop => 3,
        PieceKind::Queen => 4,
        PieceKind::King => 5,
    };
    match color {
        Color::Black => base,
        Color::White => base + 6,
    }
}

fn piece_planes(pos: &Position) -> Vec<f32> {
    let turn = side_flag(pos);
    let mut data = vec![0.0; 64 * NUM_PLANES];
    for (i, s) in fen_order().enumerate() {
        let cell = &mut data[i * NUM_PLANES..(i + 1) * NUM_PLANES];
        if let Some(pc) = pos.piece_at(s) {
            cell[plane_of(pc.kind, pc.color)] = 1.0;
        }
        cell[NUM_PLANES - 1] = turn;
    }
    data
}

fn fen_tokens(pos: &Position) -> Vec<f32> {
    let fen = pos.to_fen();
    let placement = fen.split(' ').next().unwrap_or_default();
    let mut tokens: Vec<f32> = placement
        .chars()
        .map(|ch| match chess_core::Piece::from_fen_char(ch) {
            Some(pc) => (plane_of(pc.kind, pc.color) + 1) as f32,
            None => 0.0,
        })
        .collect();
    tokens.push(side_flag(pos));
    tokens.resize(FEN_TOKEN_LEN, 0.0);
    tokens
}

#[cfg(test)]
#[path = "features_tests.rs"]
mod features_tests;
