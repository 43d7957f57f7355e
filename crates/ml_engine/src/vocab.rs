use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chess_core::MoveDetail;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Move notation a vocabulary is keyed by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    San,
    #[default]
    Uci,
}

/// Fixed move-text to id mapping of one model generation.
#[derive(Clone, Debug)]
pub struct MoveVocabulary {
    notation: Notation,
    move_to_idx: HashMap<String, u32>,
    idx_to_move: HashMap<u32, String>,
}

impl MoveVocabulary {
    /// Builds a vocabulary. Without an explicit inverse table, one is derived from `move_to_idx`.
    pub fn new(
        notation: Notation,
        move_to_idx: HashMap<String, u32>,
        idx_to_move: Option<HashMap<u32, String>>,
    ) -> Self {
        let idx_to_move = idx_to_move.unwrap_or_else(|| {
            move_to_idx
                .iter()
                .map(|(text, &idx)| (idx, text.clone()))
                .collect()
        });
        Self {
            notation,
            move_to_idx,
            idx_to_move,
        }
    }

    /// Reads `{"e4": 12}` style JSON and, when given, the `{"12": "e4"}` inverse.
    pub fn from_files(
        notation: Notation,
        move_to_idx: &Path,
        idx_to_move: Option<&Path>,
    ) -> Result<Self> {
        let forward: HashMap<String, u32> = read_json(move_to_idx)?;
        let inverse = idx_to_move.map(read_json::<HashMap<u32, String>>).transpose()?;
        let vocab = Self::new(notation, forward, inverse);
        tracing::debug!(
            path = %move_to_idx.display(),
            entries = vocab.len(),
            "loaded move vocabulary"
        );
        Ok(vocab)
    }

    pub fn notation(&self) -> Notation {
        self.notation
    }

    pub fn len(&self) -> usize {
        self.move_to_idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.move_to_idx.is_empty()
    }

    pub fn id_of(&self, text: &str) -> Option<u32> {
        self.move_to_idx
            .get(text)
            .or_else(|| self.move_to_idx.get(strip_check_marks(text)))
            .copied()
    }

    pub fn move_at(&self, idx: usize) -> Option<&str> {
        let idx = u32::try_from(idx).ok()?;
        self.idx_to_move.get(&idx).map(String::as_str)
    }

    /// The text of `detail` in this vocabulary's notation.
    pub fn text_of<'a>(&self, detail: &'a MoveDetail) -> &'a str {
        match self.notation {
            Notation::San => &detail.san,
            Notation::Uci => &detail.uci,
        }
    }
}

/// SAN without a trailing `+` or `#`, so vocabularies with and without suffixes both match.
pub(crate) fn strip_check_marks(text: &str) -> &str {
    text.trim_end_matches(['+', '#'])
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let vocab_err = |reason: String| ModelError::Vocabulary {
        path: path.to_path_buf(),
        reason,
    };
    let raw = fs::read_to_string(path).map_err(|e| vocab_err(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| vocab_err(e.to_string()))
}

#[cfg(test)]
#[path = "vocab_tests.rs"]
mod vocab_tests;
