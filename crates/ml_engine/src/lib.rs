//! Model side of the move prediction engine.
//!
//! - [`features`] and [`codec`] turn positions and move histories into tensors
//!   and score vectors back into legal moves.
//! - [`model`] binds a session to its vocabulary and input layout per model family.
//! - [`registry`] owns the loaded models.
//!
//! Real inference needs the `onnx` feature, which pulls in `tract-onnx`.
//! Without it every load fails with [`ModelError::Load`] and only injected
//! sessions are available.

pub mod codec;
pub mod error;
pub mod features;
pub mod model;
pub mod registry;
pub mod session;
pub mod vocab;

#[cfg(feature = "onnx")]
pub mod onnx_engine;

pub use codec::{decode, encode_history, legal_scores, ranked_indices};
pub use error::ModelError;
pub use features::{encode_board, encode_state, BoardEncoding};
pub use model::{LoadedModel, MiddlegameWeights, ModelConfig, ModelFamily, ModelOutput};
pub use registry::ModelRegistry;
pub use session::{Inference, InputTensor, OutputTensor, StaticSession};
pub use vocab::{MoveVocabulary, Notation};
