use thiserror::Error;

/// Errors raised while reading positions and move text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("invalid FEN `{fen}`: {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("unparsable move `{text}` at ply {ply}")]
    InvalidMove { text: String, ply: usize },
}

impl PositionError {
    pub(crate) fn fen(fen: &str, reason: impl Into<String>) -> Self {
        PositionError::InvalidFen {
            fen: fen.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PositionError>;
