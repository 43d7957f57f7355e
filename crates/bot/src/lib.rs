//! Move prediction for a chess bot.
//!
//! A [`MovePredictor`] maps each request's [`Difficulty`] to a
//! [`StrategyPlan`]: a policy model alone, an alpha-beta search ordered by a
//! policy model, or a strength-limited external engine. Searches that reach
//! the endgame first ask a tablebase service when one is configured.
//!
//! Requests wait in a per-strategy FIFO lane with its own concurrency
//! ceiling, and every answer is a legal [`chess_core::MoveDetail`].

mod config;
mod error;
mod fallback;
mod governor;
mod predictor;
mod selector;
mod tablebase;

pub use config::{PathResolver, PredictorConfig};
pub use error::{PredictError, Result};
pub use fallback::{fallback_move, fallback_move_with};
pub use governor::{Governor, GovernorConfig, Job, Ticket};
pub use predictor::{MovePredictor, MoveSource, Prediction, PredictionRequest};
pub use selector::{
    select, Difficulty, DifficultyTable, GamePhase, PhaseModels, StrategyKind, StrategyPlan,
    ENDGAME_PIECES, OPENING_PLIES,
};
pub use tablebase::{strongest, Tablebase, TablebaseConfig, TablebaseError, TablebaseMove};
