use ml_engine::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search depth {requested} exceeds the limit of {max}")]
    DepthLimit { requested: u8, max: u8 },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, SearchError>;
