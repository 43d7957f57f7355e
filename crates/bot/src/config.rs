//! TOML configuration of a [`crate::MovePredictor`].
//!
//! ```toml
//! [models.less_1000]
//! family = "history_policy"
//! path = "models/v1/model.onnx"
//! move_to_idx = "models/v1/move_to_id.json"
//! idx_to_move = "models/v1/id_to_move.json"
//!
//! [engine]
//! linux = "stockfish/stockfish-ubuntu-x86-64-avx2"
//! syzygy_linux = "stockfish/syzygy"
//!
//! [tablebase]
//! url = "https://tablebase.lichess.ovh/standard"
//!
//! [governor]
//! engine_slots = 1
//!
//! [difficulty.advanced]
//! strategy = "external_engine"
//! elo = 1750
//! depth = 10
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use external_engine::EngineConfig;
use ml_engine::ModelConfig;
use serde::Deserialize;

use crate::error::{PredictError, Result};
use crate::governor::GovernorConfig;
use crate::selector::{Difficulty, DifficultyTable};
use crate::tablebase::TablebaseConfig;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub models: BTreeMap<String, ModelConfig>,
    pub engine: EngineConfig,
    pub tablebase: TablebaseConfig,
    pub governor: GovernorConfig,
    pub difficulty: DifficultyTable,
}

impl PredictorConfig {
    /// Reads `path` and anchors every relative path at its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PredictError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml(&text, &PathResolver::new(base)).map_err(|reason| PredictError::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_toml(text: &str, resolver: &PathResolver) -> std::result::Result<Self, String> {
        let mut config: PredictorConfig = toml::from_str(text).map_err(|e| e.to_string())?;
        config.resolve_paths(resolver);
        Ok(config)
    }

    pub fn resolve_paths(&mut self, resolver: &PathResolver) {
        for model in self.models.values_mut() {
            model.path = resolver.resolve(&model.path);
            for file in [&mut model.move_to_idx, &mut model.idx_to_move] {
                if let Some(p) = file.as_mut() {
                    *p = resolver.resolve(p);
                }
            }
        }
        self.engine.map_paths(|p| resolver.resolve(p));
    }

    /// Models named by a difficulty but missing from `[models]`.
    pub fn missing_models(&self) -> Vec<(Difficulty, &str)> {
        self.difficulty
            .plans()
            .flat_map(|(difficulty, plan)| {
                plan.model_ids()
                    .into_iter()
                    .filter(|id| !self.models.contains_key(*id))
                    .map(move |id| (difficulty, id))
            })
            .collect()
    }
}

/// Turns config-relative paths into paths usable from any working directory.
#[derive(Clone, Debug)]
pub struct PathResolver {
    base: PathBuf,
}

impl PathResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
