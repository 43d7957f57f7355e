//! Leaf evaluation and move ordering.

use std::collections::HashMap;
use std::sync::Arc;

use chess_core::{evaluate, piece_value, Color, Move, MoveHistory, Position};
use ml_engine::{legal_scores, ModelError, ModelOutput, ModelRegistry};

use crate::error::Result;

/// What the search asks of a position: an ordering of its moves and a static score.
pub trait Evaluator: Send + Sync {
    /// One score per entry of `moves`; higher is searched first.
    fn order(&self, pos: &Position, history: &MoveHistory, moves: &[Move]) -> Result<Vec<f32>>;

    /// Centipawns from the side to move's point of view.
    fn evaluate(&self, pos: &Position, history: &MoveHistory) -> Result<i32>;

    /// Whether [`MoveHistory`] must be kept up to date along the search path.
    fn needs_history(&self) -> bool {
        false
    }
}

/// Material count with captures ordered most valuable victim first.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn order(&self, pos: &Position, _history: &MoveHistory, moves: &[Move]) -> Result<Vec<f32>> {
        Ok(moves.iter().map(|&mv| capture_order(pos, mv)).collect())
    }

    fn evaluate(&self, pos: &Position, _history: &MoveHistory) -> Result<i32> {
        Ok(evaluate(pos))
    }
}

/// MVV-LVA with promotions counted as captures of the promoted piece.
pub fn capture_order(pos: &Position, mv: Move) -> f32 {
    let victim = if mv.is_en_passant {
        piece_value(chess_core::PieceKind::Pawn)
    } else {
        pos.piece_at(mv.to).map(|p| piece_value(p.kind)).unwrap_or(0)
    };
    let promotion = mv.promo.map(piece_value).unwrap_or(0);
    if victim == 0 && promotion == 0 {
        return 0.0;
    }
    let attacker = pos.piece_at(mv.from).map(|p| piece_value(p.kind)).unwrap_or(0);
    (10 * (victim + promotion) - attacker / 10) as f32
}

/// Orders moves with a policy model and scores leaves with a value model.
/// Either half falls back to [`MaterialEvaluator`] when no model is given.
#[derive(Clone)]
pub struct ModelEvaluator {
    registry: Arc<ModelRegistry>,
    policy: Option<String>,
    value: Option<String>,
}

impl ModelEvaluator {
    pub fn new(registry: Arc<ModelRegistry>, policy: Option<String>, value: Option<String>) -> Self {
        Self {
            registry,
            policy,
            value,
        }
    }
}

impl Evaluator for ModelEvaluator {
    fn order(&self, pos: &Position, history: &MoveHistory, moves: &[Move]) -> Result<Vec<f32>> {
        let Some(policy) = &self.policy else {
            return MaterialEvaluator.order(pos, history, moves);
        };
        let model = self.registry.get(policy)?;
        let vocab = model
            .vocabulary()
            .ok_or_else(|| ModelError::NoVocabulary(policy.clone()))?;
        let scores = match model.score(pos, history)? {
            ModelOutput::Policy(scores) => scores,
            ModelOutput::Value(_) => return Err(ModelError::NoVocabulary(policy.clone()).into()),
        };

        let details = pos.legal_move_details();
        let by_move: HashMap<Move, f32> = details
            .iter()
            .map(|d| d.mv)
            .zip(legal_scores(&scores, &details, vocab))
            .collect();
        Ok(moves
            .iter()
            .map(|mv| by_move.get(mv).copied().unwrap_or(0.0))
            .collect())
    }

    fn evaluate(&self, pos: &Position, history: &MoveHistory) -> Result<i32> {
        let Some(value) = &self.value else {
            return Ok(evaluate(pos));
        };
        match self.registry.score(value, pos, history)? {
            ModelOutput::Value(v) => {
                let white = (v.clamp(-1.0, 1.0) * 1000.0).round() as i32;
                Ok(match pos.side_to_move {
                    Color::White => white,
                    Color::Black => -white,
                })
            }
            ModelOutput::Policy(_) => Err(ModelError::MissingOutput {
                id: value.clone(),
                output: "value_output".into(),
            }
            .into()),
        }
    }

    fn needs_history(&self) -> bool {
        self.policy.is_some()
    }
}

#[cfg(test)]
#[path = "eval_tests.rs"]
mod eval_tests;
