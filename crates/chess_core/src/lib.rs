//! Board representation and legal move generation for the prediction engine.
//!
//! Everything a strategy returns is checked against this crate: moves are
//! only handed out as [`MoveDetail`] values built from the legal move list.

pub mod board;
pub mod detail;
pub mod error;
pub mod eval;
pub mod history;
pub mod movegen;
pub mod perft;
pub mod san;
pub mod status;
pub mod types;
pub mod uci;
pub mod zobrist;

pub use board::*;
pub use detail::MoveDetail;
pub use error::PositionError;
pub use eval::{evaluate, piece_value};
pub use history::MoveHistory;
pub use movegen::*;
pub use perft::perft;
pub use san::{move_to_san, parse_san};
pub use status::GameStatus;
pub use types::*;
pub use uci::*;
pub use zobrist::ZOBRIST;
