use std::path::PathBuf;

use chess_core::{MoveDetail, MoveHistory, Position};
use serde::{Deserialize, Serialize};

use crate::codec::{encode_history, ranked_indices};
use crate::error::{ModelError, Result};
use crate::features::{encode_board, encode_state, BoardEncoding, FEN_TOKEN_LEN, STATE_FEATURES};
use crate::session::{Inference, InputTensor, OutputTensor};
use crate::vocab::{strip_check_marks, MoveVocabulary, Notation};

/// Network generations the adapter knows how to feed and read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    /// SAN history ids in, move distribution out.
    HistoryPolicy,
    /// FEN tokens and UCI history in; `next_move_output` and `outcome_output` out.
    OpeningPolicy,
    /// Piece planes and UCI history in; move, centipawn and mate heads out.
    MiddlegamePolicy,
    /// Signed squares in, scalar evaluation out.
    BoardValue,
}

impl ModelFamily {
    pub fn is_policy(self) -> bool {
        self != ModelFamily::BoardValue
    }

    fn default_max_history(self) -> usize {
        match self {
            ModelFamily::HistoryPolicy => 485,
            ModelFamily::OpeningPolicy => 28,
            ModelFamily::MiddlegamePolicy => 195,
            ModelFamily::BoardValue => 0,
        }
    }

    fn default_history_offset(self) -> usize {
        match self {
            ModelFamily::MiddlegamePolicy => 10,
            _ => 0,
        }
    }

    fn default_notation(self) -> Notation {
        match self {
            ModelFamily::HistoryPolicy => Notation::San,
            _ => Notation::Uci,
        }
    }
}

/// Re-weighting of the middlegame heads.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlegameWeights {
    /// Most probable legal moves kept as candidates.
    pub top_n: usize,
    pub probability: f32,
    pub evaluation: f32,
    /// Mate distance that maps to a full mate bonus.
    pub mate_priority: f32,
    /// Subtracted from candidates that give check.
    pub king_safety_penalty: f32,
}

impl Default for MiddlegameWeights {
    fn default() -> Self {
        Self {
            top_n: 5,
            probability: 0.4,
            evaluation: 0.6,
            mate_priority: 15.0,
            king_safety_penalty: 0.3,
        }
    }
}

/// One `[models.<id>]` entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    pub family: ModelFamily,
    pub path: PathBuf,
    #[serde(default)]
    pub move_to_idx: Option<PathBuf>,
    #[serde(default)]
    pub idx_to_move: Option<PathBuf>,
    #[serde(default)]
    pub notation: Option<Notation>,
    #[serde(default)]
    pub max_history: Option<usize>,
    #[serde(default)]
    pub history_offset: Option<usize>,
    /// Feed the game-state vector as a second input (value models only).
    #[serde(default)]
    pub state_features: bool,
    #[serde(default)]
    pub weights: MiddlegameWeights,
}

impl ModelConfig {
    pub fn new(family: ModelFamily, path: impl Into<PathBuf>) -> Self {
        Self {
            family,
            path: path.into(),
            move_to_idx: None,
            idx_to_move: None,
            notation: None,
            max_history: None,
            history_offset: None,
            state_features: false,
            weights: MiddlegameWeights::default(),
        }
    }

    pub fn notation(&self) -> Notation {
        self.notation.unwrap_or(self.family.default_notation())
    }

    pub fn max_history(&self) -> usize {
        self.max_history
            .unwrap_or(self.family.default_max_history())
    }

    pub fn history_offset(&self) -> usize {
        self.history_offset
            .unwrap_or(self.family.default_history_offset())
    }

    /// Input shapes in `args_N` order.
    pub fn input_shapes(&self) -> Vec<Vec<usize>> {
        let history = vec![1, self.max_history()];
        match self.family {
            ModelFamily::HistoryPolicy => vec![history],
            ModelFamily::OpeningPolicy => vec![vec![1, FEN_TOKEN_LEN], history],
            ModelFamily::MiddlegamePolicy => vec![BoardEncoding::PiecePlanes.shape(), history],
            ModelFamily::BoardValue => {
                let mut shapes = vec![BoardEncoding::SignedSquares.shape()];
                if self.state_features {
                    shapes.push(vec![1, STATE_FEATURES]);
                }
                shapes
            }
        }
    }
}

/// Result of one forward pass.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelOutput {
    /// Score per vocabulary index.
    Policy(Vec<f32>),
    /// Evaluation in `[-1, 1]` from white's point of view.
    Value(f32),
}

/// A session bound to its vocabulary and input layout. Read-only once built.
pub struct LoadedModel {
    id: String,
    config: ModelConfig,
    vocab: Option<MoveVocabulary>,
    session: Box<dyn Inference>,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("id", &self.id)
            .field("family", &self.config.family)
            .finish_non_exhaustive()
    }
}

impl LoadedModel {
    /// Reads the vocabulary and weights named by `config`.
    pub fn load(id: &str, config: &ModelConfig) -> Result<Self> {
        let load_err = |reason: String| ModelError::Load {
            id: id.to_string(),
            path: config.path.clone(),
            reason,
        };
        if !config.path.is_file() {
            return Err(load_err("model file not found".into()));
        }

        let vocab = if config.family.is_policy() {
            let forward = config
                .move_to_idx
                .as_deref()
                .ok_or_else(|| load_err("policy model without `move_to_idx`".into()))?;
            Some(MoveVocabulary::from_files(
                config.notation(),
                forward,
                config.idx_to_move.as_deref(),
            )?)
        } else {
            None
        };

        let session = open_session(config).map_err(load_err)?;
        Ok(Self::from_session(id, config.clone(), vocab, session))
    }

    /// Wraps an already constructed session.
    pub fn from_session(
        id: impl Into<String>,
        config: ModelConfig,
        vocab: Option<MoveVocabulary>,
        session: Box<dyn Inference>,
    ) -> Self {
        Self {
            id: id.into(),
            config,
            vocab,
            session,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn family(&self) -> ModelFamily {
        self.config.family
    }

    pub fn vocabulary(&self) -> Option<&MoveVocabulary> {
        self.vocab.as_ref()
    }

    /// One forward pass for `pos`, reached through `history`.
    pub fn score(&self, pos: &Position, history: &MoveHistory) -> Result<ModelOutput> {
        let inputs = self.inputs(pos, history)?;
        let outputs = self
            .session
            .run(inputs)
            .map_err(|reason| ModelError::Inference {
                id: self.id.clone(),
                reason,
            })?;

        match self.config.family {
            ModelFamily::BoardValue => {
                let head = self.head(&outputs, "value_output", 0)?;
                let value = head.data.first().copied().ok_or_else(|| self.missing("value_output"))?;
                Ok(ModelOutput::Value(value))
            }
            ModelFamily::HistoryPolicy => {
                Ok(ModelOutput::Policy(self.head(&outputs, "output_0", 0)?.data.clone()))
            }
            ModelFamily::OpeningPolicy => {
                let policy = self.head(&outputs, "next_move_output", 0)?;
                if let Ok(outcome) = self.head(&outputs, "outcome_output", 1) {
                    tracing::debug!(model = %self.id, outcome = ?outcome.data, "opening outcome head");
                }
                Ok(ModelOutput::Policy(policy.data.clone()))
            }
            ModelFamily::MiddlegamePolicy => {
                let policy = self.head(&outputs, "next_move_output", 0)?;
                let cp = self.head(&outputs, "cp_outputs", 1)?;
                let mate = self.head(&outputs, "mate_outputs", 2)?;
                let vocab = self.require_vocab()?;
                Ok(ModelOutput::Policy(weight_middlegame(
                    &policy.data,
                    &cp.data,
                    &mate.data,
                    pos,
                    vocab,
                    &self.config.weights,
                )))
            }
        }
    }

    fn inputs(&self, pos: &Position, history: &MoveHistory) -> Result<Vec<InputTensor>> {
        let family = self.config.family;
        if family == ModelFamily::BoardValue {
            let mut inputs = vec![encode_board(pos, BoardEncoding::SignedSquares)];
            if self.config.state_features {
                inputs.push(encode_state(pos));
            }
            return Ok(inputs);
        }

        let vocab = self.require_vocab()?;
        let played = match vocab.notation() {
            Notation::San => history.san(),
            Notation::Uci => history.uci(),
        };
        let played = played.get(self.config.history_offset()..).unwrap_or(&[]);
        let moves = encode_history(played, vocab, self.config.max_history());

        Ok(match family {
            ModelFamily::HistoryPolicy => vec![moves],
            ModelFamily::OpeningPolicy => vec![encode_board(pos, BoardEncoding::FenTokens), moves],
            _ => vec![encode_board(pos, BoardEncoding::PiecePlanes), moves],
        })
    }

    fn require_vocab(&self) -> Result<&MoveVocabulary> {
        self.vocab
            .as_ref()
            .ok_or_else(|| ModelError::NoVocabulary(self.id.clone()))
    }

    /// Output by name, falling back to its position when the graph lost the names.
    fn head<'a>(
        &self,
        outputs: &'a [OutputTensor],
        name: &str,
        position: usize,
    ) -> Result<&'a OutputTensor> {
        outputs
            .iter()
            .find(|o| o.name == name)
            .or_else(|| outputs.get(position))
            .ok_or_else(|| self.missing(name))
    }

    fn missing(&self, output: &str) -> ModelError {
        ModelError::MissingOutput {
            id: self.id.clone(),
            output: output.to_string(),
        }
    }
}

/// Blends move probability with the evaluation heads for the `top_n` most probable
/// legal moves. Everything else scores negative infinity.
///
/// Candidates always score above zero, so they rank ahead of moves the
/// vocabulary does not know.
pub fn weight_middlegame(
    probs: &[f32],
    cp: &[f32],
    mate: &[f32],
    pos: &Position,
    vocab: &MoveVocabulary,
    weights: &MiddlegameWeights,
) -> Vec<f32> {
    let legal = pos.legal_move_details();
    let find_legal = |text: &str| -> Option<&MoveDetail> {
        let text = strip_check_marks(text);
        legal
            .iter()
            .find(|d| strip_check_marks(vocab.text_of(d)) == text)
    };
    let penalty = if pos.piece_count() < 14 {
        weights.king_safety_penalty + 0.1
    } else {
        weights.king_safety_penalty
    };

    let mut out = vec![f32::NEG_INFINITY; probs.len()];
    let candidates = ranked_indices(probs)
        .into_iter()
        .filter_map(|idx| Some((idx, find_legal(vocab.move_at(idx)?)?)))
        .take(weights.top_n);

    for (rank, (idx, detail)) in candidates.enumerate() {
        let cp_eval = (cp.get(idx).copied().unwrap_or(0.0) * 1000.0 / 500.0).clamp(-1.0, 1.0);
        let mate_raw = mate.get(idx).copied().unwrap_or(0.0);
        let mate_eval = if mate_raw.abs() < 0.01 {
            0.0
        } else {
            (mate_raw / weights.mate_priority).clamp(-1.0, 1.0)
        };
        let blended = 0.8 * mate_eval + 0.4 * cp_eval;
        let gives_check = detail.after.in_check(detail.after.side_to_move);
        let score = weights.probability * probs[idx].max(0.0).powf(0.75)
            + weights.evaluation * blended
            - if gives_check { penalty } else { 0.0 };
        // Equal weights keep probability order.
        out[idx] = score.max(0.0) + (weights.top_n - rank) as f32 * f32::EPSILON;
    }
    out
}

#[cfg(feature = "onnx")]
fn open_session(config: &ModelConfig) -> std::result::Result<Box<dyn Inference>, String> {
    let session = crate::onnx_engine::TractSession::load(&config.path, &config.input_shapes())?;
    tracing::debug!(outputs = ?session.output_names(), "onnx session ready");
    Ok(Box::new(session))
}

#[cfg(not(feature = "onnx"))]
fn open_session(_config: &ModelConfig) -> std::result::Result<Box<dyn Inference>, String> {
    Err("built without the `onnx` feature".into())
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod model_tests;
