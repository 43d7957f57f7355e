use std::path::PathBuf;

use chess_core::PositionError;
use external_engine::EngineError;
use ml_engine::ModelError;
use search_engine::SearchError;
use thiserror::Error;

use crate::selector::StrategyKind;
use crate::tablebase::TablebaseError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Tablebase(#[from] TablebaseError),

    #[error("no legal move in {fen}")]
    NoLegalMove { fen: String },

    #[error("{lane} queue is full ({max} waiting)")]
    QueueOverflow { lane: StrategyKind, max: usize },

    #[error("predictor has not been preloaded")]
    NotReady,

    #[error("predictor is shutting down")]
    ShuttingDown,

    #[error("{lane} worker panicked: {message}")]
    WorkerPanicked { lane: StrategyKind, message: String },

    #[error("config {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, PredictError>;
