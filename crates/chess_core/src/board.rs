use crate::error::{PositionError, Result};
use crate::types::*;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CastlingRights {
    pub wk: bool,
    pub wq: bool,
    pub bk: bool,
    pub bq: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        Self {
            wk: true,
            wq: true,
            bk: true,
            bq: true,
        }
    }

    /// Rights in FEN order `KQkq`.
    pub fn as_array(&self) -> [bool; 4] {
        [self.wk, self.wq, self.bk, self.bq]
    }

    /// Drops any right tied to a king or rook home square.
    fn touch(&mut self, square: u8) {
        match square {
            0 => self.wq = false,
            7 => self.wk = false,
            4 => {
                self.wk = false;
                self.wq = false;
            }
            56 => self.bq = false,
            63 => self.bk = false,
            60 => {
                self.bk = false;
                self.bq = false;
            }
            _ => {}
        }
    }
}

/// Full game state. Search derives a fresh value per ply through [`Position::after`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub board: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<u8>, // square behind a pawn that just advanced 2
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

#[derive(Clone, Debug)]
pub struct Undo {
    pub captured: Option<Piece>,
    pub castling: CastlingRights,
    pub en_passant: Option<u8>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub moved_piece: Piece,
    pub rook_move: Option<(u8, u8)>, // (rook_from, rook_to) for castling
    pub ep_captured_sq: Option<u8>,  // square actually captured in en-passant
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    pub fn startpos() -> Self {
        let mut p = Position {
            board: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        };

        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (f, &kind) in back.iter().enumerate() {
            p.board[f] = Some(Piece::new(Color::White, kind));
            p.board[8 + f] = Some(Piece::new(Color::White, PieceKind::Pawn));
            p.board[48 + f] = Some(Piece::new(Color::Black, PieceKind::Pawn));
            p.board[56 + f] = Some(Piece::new(Color::Black, kind));
        }
        p
    }

    /// Parses Forsyth-Edwards Notation. The clock fields are optional and
    /// default to `0 1`. Both kings must be on the board.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 || parts.len() > 6 {
            return Err(PositionError::fen(fen, "expected 4 to 6 fields"));
        }

        let mut board = [None; 64];
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(PositionError::fen(fen, "placement must have 8 ranks"));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let mut file: i8 = 0;
            let rank: i8 = 7 - rank_idx as i8; // FEN lists rank 8 .. 1
            for ch in rank_str.chars() {
                if let Some(d) = ch.to_digit(10) {
                    if d == 0 || d > 8 {
                        return Err(PositionError::fen(fen, format!("bad empty run `{ch}`")));
                    }
                    file += d as i8;
                } else {
                    let piece = Piece::from_fen_char(ch)
                        .ok_or_else(|| PositionError::fen(fen, format!("bad piece `{ch}`")))?;
                    let target = sq(file, rank)
                        .ok_or_else(|| PositionError::fen(fen, "rank overflows 8 files"))?;
                    board[target as usize] = Some(piece);
                    file += 1;
                }
                if file > 8 {
                    return Err(PositionError::fen(fen, "rank overflows 8 files"));
                }
            }
            if file != 8 {
                return Err(PositionError::fen(fen, "rank has fewer than 8 files"));
            }
        }

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(PositionError::fen(fen, format!("bad side to move `{other}`")));
            }
        };

        let mut castling = CastlingRights::default();
        if parts[2] != "-" {
            for c in parts[2].chars() {
                match c {
                    'K' => castling.wk = true,
                    'Q' => castling.wq = true,
                    'k' => castling.bk = true,
                    'q' => castling.bq = true,
                    _ => return Err(PositionError::fen(fen, format!("bad castling `{c}`"))),
                }
            }
        }

        let en_passant = match parts[3] {
            "-" => None,
            coord => Some(
                coord_to_sq(coord)
                    .filter(|&s| rank_of(s) == 2 || rank_of(s) == 5)
                    .ok_or_else(|| PositionError::fen(fen, format!("bad en-passant `{coord}`")))?,
            ),
        };

        let halfmove_clock = match parts.get(4) {
            Some(v) => v
                .parse()
                .map_err(|_| PositionError::fen(fen, "bad halfmove clock"))?,
            None => 0,
        };
        let fullmove_number = match parts.get(5) {
            Some(v) => v
                .parse()
                .map_err(|_| PositionError::fen(fen, "bad fullmove number"))?,
            None => 1,
        };

        let pos = Position {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        };
        for color in [Color::White, Color::Black] {
            if pos.king_sq(color).is_none() {
                return Err(PositionError::fen(fen, format!("missing {color:?} king")));
            }
        }
        Ok(pos)
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.board[rank * 8 + file] {
                    Some(pc) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        out.push(pc.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(self.side_to_move.fen_char());
        out.push(' ');
        let rights: String = self
            .castling
            .as_array()
            .iter()
            .zip(['K', 'Q', 'k', 'q'])
            .filter_map(|(&on, ch)| on.then_some(ch))
            .collect();
        out.push_str(if rights.is_empty() { "-" } else { &rights });
        out.push(' ');
        match self.en_passant {
            Some(ep) => out.push_str(&sq_to_coord(ep)),
            None => out.push('-'),
        }
        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        out
    }

    pub fn king_sq(&self, c: Color) -> Option<u8> {
        (0..64u8).find(|&i| self.board[i as usize] == Some(Piece::new(c, PieceKind::King)))
    }

    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        self.board[sq as usize]
    }
    pub fn set_piece(&mut self, sq: u8, pc: Option<Piece>) {
        self.board[sq as usize] = pc;
    }

    /// Number of pieces on the board, kings included.
    pub fn piece_count(&self) -> usize {
        self.board.iter().flatten().count()
    }

    /// The position reached by playing `mv`. `self` is left untouched.
    pub fn after(&self, mv: Move) -> Position {
        let mut next = self.clone();
        next.make_move(mv);
        next
    }

    pub fn in_check(&self, c: Color) -> bool {
        match self.king_sq(c) {
            Some(ksq) => self.is_square_attacked(ksq, c.other()),
            None => false,
        }
    }

    pub fn is_square_attacked(&self, target: u8, by: Color) -> bool {
        let tf = file_of(target);
        let tr = rank_of(target);
        let holds = |f: i8, r: i8, kinds: &[PieceKind]| {
            sq(f, r)
                .and_then(|s| self.piece_at(s))
                .is_some_and(|pc| pc.color == by && kinds.contains(&pc.kind))
        };

        // A pawn attacks the target from one rank behind it, relative to its own direction.
        let pawn_rank = match by {
            Color::White => tr - 1,
            Color::Black => tr + 1,
        };
        if holds(tf - 1, pawn_rank, &[PieceKind::Pawn]) || holds(tf + 1, pawn_rank, &[PieceKind::Pawn])
        {
            return true;
        }
        if KNIGHT_STEPS
            .iter()
            .any(|(df, dr)| holds(tf + df, tr + dr, &[PieceKind::Knight]))
        {
            return true;
        }
        if KING_STEPS
            .iter()
            .any(|(df, dr)| holds(tf + df, tr + dr, &[PieceKind::King]))
        {
            return true;
        }

        let rays: [(&[(i8, i8)], [PieceKind; 2]); 2] = [
            (&DIAGONALS, [PieceKind::Bishop, PieceKind::Queen]),
            (&ORTHOGONALS, [PieceKind::Rook, PieceKind::Queen]),
        ];
        for (dirs, sliders) in rays {
            for (df, dr) in dirs {
                let mut f = tf + df;
                let mut r = tr + dr;
                while let Some(s) = sq(f, r) {
                    if let Some(pc) = self.piece_at(s) {
                        if pc.color == by && sliders.contains(&pc.kind) {
                            return true;
                        }
                        break;
                    }
                    f += df;
                    r += dr;
                }
            }
        }
        false
    }

    /// Plays a pseudo-legal move in place.
    ///
    /// # Panics
    /// If `mv.from` is empty. Moves must come from the generator.
    pub fn make_move(&mut self, mv: Move) -> Undo {
        let from = mv.from;
        let to = mv.to;
        let moved = self
            .piece_at(from)
            .expect("make_move called with an empty from-square");
        let mut captured = self.piece_at(to);
        let undo_castling = self.castling;
        let undo_ep = self.en_passant;
        let undo_hmc = self.halfmove_clock;
        let undo_fmn = self.fullmove_number;

        self.en_passant = None;
        let mut reset_hmc = moved.kind == PieceKind::Pawn || captured.is_some();

        let mut ep_captured_sq = None;
        if mv.is_en_passant {
            let behind = match moved.color {
                Color::White => rank_of(to) - 1,
                Color::Black => rank_of(to) + 1,
            };
            if let Some(cs) = sq(file_of(to), behind) {
                captured = self.piece_at(cs);
                self.set_piece(cs, None);
                ep_captured_sq = Some(cs);
                reset_hmc = true;
            }
        }

        self.set_piece(from, None);
        let landed = match mv.promo {
            Some(kind) if moved.kind == PieceKind::Pawn => Piece::new(moved.color, kind),
            _ if moved.kind == PieceKind::Pawn && is_last_rank(moved.color, to) => {
                Piece::new(moved.color, PieceKind::Queen)
            }
            _ => moved,
        };
        self.set_piece(to, Some(landed));

        let mut rook_move = None;
        if mv.is_castle
            && moved.kind == PieceKind::King
            && let Some((rf, rt)) = castle_rook_squares(to)
            && let Some(rook) = self.piece_at(rf)
        {
            self.set_piece(rf, None);
            self.set_piece(rt, Some(rook));
            rook_move = Some((rf, rt));
        }

        self.castling.touch(from);
        self.castling.touch(to);

        if moved.kind == PieceKind::Pawn && (rank_of(from) - rank_of(to)).abs() == 2 {
            self.en_passant = sq(file_of(from), (rank_of(from) + rank_of(to)) / 2);
        }

        self.halfmove_clock = if reset_hmc {
            0
        } else {
            self.halfmove_clock + 1
        };
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.other();

        Undo {
            captured,
            castling: undo_castling,
            en_passant: undo_ep,
            halfmove_clock: undo_hmc,
            fullmove_number: undo_fmn,
            moved_piece: moved,
            rook_move,
            ep_captured_sq,
        }
    }

    pub fn unmake_move(&mut self, mv: Move, undo: Undo) {
        self.side_to_move = self.side_to_move.other();
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;

        if let Some((rf, rt)) = undo.rook_move {
            let rook = self.piece_at(rt);
            self.set_piece(rt, None);
            self.set_piece(rf, rook);
        }

        // The moved piece goes back as it was, which also reverts promotions.
        self.set_piece(mv.from, Some(undo.moved_piece));
        match undo.ep_captured_sq {
            Some(cs) if mv.is_en_passant => {
                self.set_piece(mv.to, None);
                self.set_piece(cs, undo.captured);
            }
            _ => self.set_piece(mv.to, undo.captured),
        }
    }
}

pub(crate) const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];

pub(crate) const KING_STEPS: [(i8, i8); 8] = [
    (1, 1),
    (1, 0),
    (1, -1),
    (0, 1),
    (0, -1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

pub(crate) const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub(crate) const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub(crate) fn is_last_rank(color: Color, square: u8) -> bool {
    match color {
        Color::White => rank_of(square) == 7,
        Color::Black => rank_of(square) == 0,
    }
}

/// Rook (from, to) for a castling king landing on `king_to`.
fn castle_rook_squares(king_to: u8) -> Option<(u8, u8)> {
    match king_to {
        6 => Some((7, 5)),
        2 => Some((0, 3)),
        62 => Some((63, 61)),
        58 => Some((56, 59)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
