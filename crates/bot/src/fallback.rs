use chess_core::{piece_value, MoveDetail, Position};
use rand::seq::SliceRandom;
use rand::Rng;

/// A move for when no strategy produced one: the best capture by victim
/// value (cheapest attacker on ties), otherwise a random legal move.
pub fn fallback_move(pos: &Position) -> Option<MoveDetail> {
    fallback_move_with(pos, &mut rand::thread_rng())
}

pub fn fallback_move_with<R: Rng + ?Sized>(pos: &Position, rng: &mut R) -> Option<MoveDetail> {
    let legal = pos.legal_move_details();
    let best_capture = legal
        .iter()
        .filter_map(|d| d.captured.map(|victim| (d, victim)))
        .max_by_key(|(d, victim)| (piece_value(*victim), -piece_value(d.piece)))
        .map(|(d, _)| d.clone());
    best_capture.or_else(|| legal.choose(rng).cloned())
}
