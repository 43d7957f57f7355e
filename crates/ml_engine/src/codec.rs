//! History encoding and policy decoding.
//!
//! [`decode`] is the only path from a raw score vector to a move, and it only
//! ever returns one of the legal moves it is given.

use std::cmp::Ordering;
use std::collections::HashMap;

use chess_core::MoveDetail;

use crate::session::InputTensor;
use crate::vocab::{strip_check_marks, MoveVocabulary};

/// Ids of `moves`, right-padded with 0 or truncated to `max_len`. Unknown moves map to 0.
pub fn encode_history<S: AsRef<str>>(
    moves: &[S],
    vocab: &MoveVocabulary,
    max_len: usize,
) -> InputTensor {
    let mut ids: Vec<f32> = moves
        .iter()
        .take(max_len)
        .map(|m| vocab.id_of(m.as_ref()).unwrap_or(0) as f32)
        .collect();
    ids.resize(max_len, 0.0);
    InputTensor::new(vec![1, max_len], ids)
}

/// Indices sorted by descending score. Equal scores keep index order and NaN sorts last.
pub fn ranked_indices(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| descending(scores[a], scores[b]));
    order
}

fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// Highest-scoring vocabulary entry that is also a legal move.
pub fn decode(
    scores: &[f32],
    legal: &[MoveDetail],
    vocab: &MoveVocabulary,
) -> Option<MoveDetail> {
    let by_text: HashMap<&str, &MoveDetail> = legal
        .iter()
        .map(|d| (strip_check_marks(vocab.text_of(d)), d))
        .collect();

    ranked_indices(scores).into_iter().find_map(|idx| {
        let text = vocab.move_at(idx)?;
        by_text.get(strip_check_marks(text)).map(|d| (*d).clone())
    })
}

/// Score of each legal move, in `legal` order. Moves outside the vocabulary score 0.
pub fn legal_scores(scores: &[f32], legal: &[MoveDetail], vocab: &MoveVocabulary) -> Vec<f32> {
    legal
        .iter()
        .map(|d| {
            vocab
                .id_of(vocab.text_of(d))
                .and_then(|id| scores.get(id as usize).copied())
                .unwrap_or(0.0)
        })
        .collect()
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod codec_tests;
