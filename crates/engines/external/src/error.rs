use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::ProtocolError;
use crate::EngineState;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot start engine {path}: {reason}")]
    Spawn { path: PathBuf, reason: String },

    #[error("engine gave no move within {0:?}")]
    Timeout(Duration),

    #[error("engine answered illegal move '{mv}' for {fen}")]
    IllegalMove { mv: String, fen: String },

    #[error("engine exited while {0}")]
    Crashed(EngineState),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("engine i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
