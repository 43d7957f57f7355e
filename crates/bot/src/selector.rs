//! Difficulty tiers and the strategy each one plays with.

use std::fmt;
use std::str::FromStr;

use chess_core::Position;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Novice,
    Intermediate,
    Advanced,
    Master,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Novice,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Master,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Novice => "novice",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Master => "master",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown difficulty '{s}'"))
    }
}

/// Which lane a plan runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    PolicyOnly,
    SearchWithModel,
    ExternalEngine,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::PolicyOnly,
        StrategyKind::SearchWithModel,
        StrategyKind::ExternalEngine,
    ];
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::PolicyOnly => "policy",
            StrategyKind::SearchWithModel => "search",
            StrategyKind::ExternalEngine => "engine",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

/// Plies played before the middlegame model takes over.
pub const OPENING_PLIES: usize = 10;
/// Pieces on the board, kings included, at or below which the endgame starts.
pub const ENDGAME_PIECES: usize = 7;

impl GamePhase {
    pub fn classify(pos: &Position, plies: usize) -> Self {
        if plies <= OPENING_PLIES {
            GamePhase::Opening
        } else if pos.piece_count() <= ENDGAME_PIECES {
            GamePhase::Endgame
        } else {
            GamePhase::Middlegame
        }
    }
}

/// Move-ordering model per game phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseModels {
    pub opening: String,
    pub middlegame: String,
    #[serde(default)]
    pub endgame: Option<String>,
}

impl PhaseModels {
    pub fn for_phase(&self, phase: GamePhase) -> &str {
        match phase {
            GamePhase::Opening => &self.opening,
            GamePhase::Middlegame => &self.middlegame,
            GamePhase::Endgame => self.endgame.as_deref().unwrap_or(&self.middlegame),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyPlan {
    /// Play the policy model's most likely legal move.
    PolicyOnly { model: String },
    /// Alpha-beta search ordered by the phase's policy model.
    SearchWithModel {
        depth: u8,
        #[serde(default)]
        max_moves: Option<usize>,
        models: PhaseModels,
        /// Scores leaves instead of material when set.
        #[serde(default)]
        value_model: Option<String>,
    },
    /// Ask the external engine, strength-limited to `elo`.
    ExternalEngine { elo: u32, depth: u8 },
}

impl StrategyPlan {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyPlan::PolicyOnly { .. } => StrategyKind::PolicyOnly,
            StrategyPlan::SearchWithModel { .. } => StrategyKind::SearchWithModel,
            StrategyPlan::ExternalEngine { .. } => StrategyKind::ExternalEngine,
        }
    }

    /// Model ids this plan may consult.
    pub fn model_ids(&self) -> Vec<&str> {
        match self {
            StrategyPlan::PolicyOnly { model } => vec![model.as_str()],
            StrategyPlan::SearchWithModel {
                models,
                value_model,
                ..
            } => {
                let mut ids = vec![models.opening.as_str(), models.middlegame.as_str()];
                ids.extend(models.endgame.as_deref());
                ids.extend(value_model.as_deref());
                ids
            }
            StrategyPlan::ExternalEngine { .. } => Vec::new(),
        }
    }
}

/// The `[difficulty.<tier>]` sections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    pub novice: StrategyPlan,
    pub intermediate: StrategyPlan,
    pub advanced: StrategyPlan,
    pub master: StrategyPlan,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            novice: StrategyPlan::PolicyOnly {
                model: "less_1000".into(),
            },
            intermediate: StrategyPlan::SearchWithModel {
                depth: 2,
                max_moves: Some(5),
                models: PhaseModels {
                    opening: "1000_1500_opening".into(),
                    middlegame: "1000_1500_middle".into(),
                    endgame: None,
                },
                value_model: None,
            },
            advanced: StrategyPlan::ExternalEngine {
                elo: 1750,
                depth: 10,
            },
            master: StrategyPlan::ExternalEngine {
                elo: 2750,
                depth: 20,
            },
        }
    }
}

impl DifficultyTable {
    pub fn get(&self, difficulty: Difficulty) -> &StrategyPlan {
        match difficulty {
            Difficulty::Novice => &self.novice,
            Difficulty::Intermediate => &self.intermediate,
            Difficulty::Advanced => &self.advanced,
            Difficulty::Master => &self.master,
        }
    }

    pub fn plans(&self) -> impl Iterator<Item = (Difficulty, &StrategyPlan)> {
        Difficulty::ALL.into_iter().map(move |d| (d, self.get(d)))
    }
}

pub fn select(difficulty: Difficulty, table: &DifficultyTable) -> StrategyPlan {
    table.get(difficulty).clone()
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod selector_tests;
