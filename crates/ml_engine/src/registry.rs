use std::collections::HashMap;
use std::sync::Arc;

use chess_core::{MoveDetail, MoveHistory, Position};

use crate::codec::decode;
use crate::error::{ModelError, Result};
use crate::model::{LoadedModel, ModelConfig, ModelOutput};

/// Owns every loaded session, keyed by model id.
///
/// Lookups never load lazily: an id that was not loaded up front is an error.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Arc<LoadedModel>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every entry, failing on the first model that cannot be loaded.
    pub fn load<'a, I>(configs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a ModelConfig)>,
    {
        let mut registry = Self::new();
        for (id, config) in configs {
            let model = LoadedModel::load(id, config)?;
            tracing::info!(model = %id, family = ?config.family, path = %config.path.display(), "model loaded");
            registry.insert(model);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, model: LoadedModel) {
        self.models.insert(model.id().to_string(), Arc::new(model));
    }

    pub fn get(&self, id: &str) -> Result<Arc<LoadedModel>> {
        self.models
            .get(id)
            .cloned()
            .ok_or_else(|| ModelError::NotLoaded(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn clear(&mut self) {
        self.models.clear();
    }

    pub fn score(&self, id: &str, pos: &Position, history: &MoveHistory) -> Result<ModelOutput> {
        self.get(id)?.score(pos, history)
    }

    /// Runs a policy model and decodes its choice against `legal`.
    /// `Ok(None)` means the model preferred nothing that is legal here.
    pub fn predict(
        &self,
        id: &str,
        pos: &Position,
        history: &MoveHistory,
        legal: &[MoveDetail],
    ) -> Result<Option<MoveDetail>> {
        let model = self.get(id)?;
        let vocab = model
            .vocabulary()
            .ok_or_else(|| ModelError::NoVocabulary(id.to_string()))?;
        match model.score(pos, history)? {
            ModelOutput::Policy(scores) => Ok(decode(&scores, legal, vocab)),
            ModelOutput::Value(_) => Err(ModelError::NoVocabulary(id.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
