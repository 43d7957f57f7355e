//! Zobrist keys for positions.
//!
//! A position key XORs one random value per occupied (piece, square) pair,
//! plus values for black to move, each castling right and the en-passant file.
//! The search layer uses it for transposition tables and repetition checks.

use crate::board::Position;
use crate::types::{file_of, Color, Piece};

/// Random values indexed by the position features they stand for.
pub struct ZobristKeys {
    /// Indexed by [color][piece_kind][square].
    pub pieces: [[[u64; 64]; 6]; 2],
    pub side_to_move: u64,
    /// [wk, wq, bk, bq]
    pub castling: [u64; 4],
    pub en_passant: [u64; 8],
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl ZobristKeys {
    /// Deterministic keys from a fixed xorshift64 seed, evaluated at compile time.
    pub const fn new() -> Self {
        const fn xorshift64(mut state: u64) -> u64 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        }

        let mut state = 0x9E37_79B9_7F4A_7C15u64;

        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut color = 0;
        while color < 2 {
            let mut kind = 0;
            while kind < 6 {
                let mut square = 0;
                while square < 64 {
                    state = xorshift64(state);
                    pieces[color][kind][square] = state;
                    square += 1;
                }
                kind += 1;
            }
            color += 1;
        }

        state = xorshift64(state);
        let side_to_move = state;

        let mut castling = [0u64; 4];
        let mut i = 0;
        while i < 4 {
            state = xorshift64(state);
            castling[i] = state;
            i += 1;
        }

        let mut en_passant = [0u64; 8];
        let mut i = 0;
        while i < 8 {
            state = xorshift64(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            side_to_move,
            castling,
            en_passant,
        }
    }

    #[inline(always)]
    pub fn piece_key(&self, piece: Piece, sq: u8) -> u64 {
        self.pieces[piece.color.idx()][piece.kind.idx()][sq as usize]
    }

    /// Full key of `pos`. Clocks are not part of the key, so positions that differ
    /// only in move counters collide on purpose.
    pub fn hash(&self, pos: &Position) -> u64 {
        let mut key = 0u64;
        for (sq, pc) in pos.board.iter().enumerate() {
            if let Some(pc) = pc {
                key ^= self.piece_key(*pc, sq as u8);
            }
        }
        if pos.side_to_move == Color::Black {
            key ^= self.side_to_move;
        }
        for (i, on) in pos.castling.as_array().into_iter().enumerate() {
            if on {
                key ^= self.castling[i];
            }
        }
        if let Some(ep) = pos.en_passant {
            key ^= self.en_passant[file_of(ep) as usize];
        }
        key
    }
}

pub static ZOBRIST: ZobristKeys = ZobristKeys::new();

impl Position {
    pub fn position_hash(&self) -> u64 {
        ZOBRIST.hash(self)
    }
}

#[cfg(test)]
#[path = "zobrist_tests.rs"]
mod zobrist_tests;
