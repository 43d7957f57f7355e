use std::path::PathBuf;

use thiserror::Error;

/// Failures of the model adapter.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to load model `{id}` from {}: {reason}", path.display())]
    Load {
        id: String,
        path: PathBuf,
        reason: String,
    },

    #[error("model `{0}` is not loaded")]
    NotLoaded(String),

    #[error("invalid vocabulary {}: {reason}", path.display())]
    Vocabulary { path: PathBuf, reason: String },

    #[error("model `{0}` has no move vocabulary")]
    NoVocabulary(String),

    #[error("inference failed for model `{id}`: {reason}")]
    Inference { id: String, reason: String },

    #[error("model `{id}` did not produce output `{output}`")]
    MissingOutput { id: String, output: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
