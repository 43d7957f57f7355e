use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chess_core::{MoveDetail, MoveHistory, Position};
use external_engine::ExternalEngine;
use ml_engine::ModelRegistry;
use search_engine::{ModelEvaluator, SearchConfig, SearchCore};
use tokio::sync::RwLock;

use crate::config::PredictorConfig;
use crate::error::{PredictError, Result};
use crate::fallback::fallback_move;
use crate::governor::Governor;
use crate::selector::{select, Difficulty, GamePhase, StrategyKind, StrategyPlan};
use crate::tablebase::Tablebase;

/// What produced a [`Prediction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveSource {
    Model,
    Search,
    Engine,
    /// An endgame tablebase lookup.
    Tablebase,
    /// The strategy had nothing legal to offer.
    Fallback,
    /// Only one legal move existed.
    Forced,
}

impl fmt::Display for MoveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MoveSource::Model => "model",
            MoveSource::Search => "search",
            MoveSource::Engine => "engine",
            MoveSource::Tablebase => "tablebase",
            MoveSource::Fallback => "fallback",
            MoveSource::Forced => "forced",
        })
    }
}

#[derive(Clone, Debug)]
pub struct Prediction {
    pub mv: MoveDetail,
    pub difficulty: Difficulty,
    pub strategy: StrategyKind,
    pub source: MoveSource,
}

/// One queued request with its strategy already chosen.
#[derive(Clone, Debug)]
pub struct PredictionRequest {
    pub position: Position,
    pub history: MoveHistory,
    pub difficulty: Difficulty,
    pub plan: StrategyPlan,
}

/// What every job needs, shared by all lanes.
struct Strategies {
    registry: Arc<ModelRegistry>,
    engine: ExternalEngine,
    tablebase: Option<Tablebase>,
}

struct Ready {
    strategies: Arc<Strategies>,
    governor: Governor<Prediction>,
}

/// Entry point for move requests.
///
/// Created unloaded; [`MovePredictor::preload`] loads the models and starts
/// the request lanes, [`MovePredictor::shutdown`] stops them again.
pub struct MovePredictor {
    config: PredictorConfig,
    ready: RwLock<Option<Arc<Ready>>>,
    /// How many times the lanes were started.
    generation: AtomicU64,
}

impl MovePredictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self {
            config,
            ready: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub async fn is_ready(&self) -> bool {
        self.ready.read().await.is_some()
    }

    /// Loads every configured model and starts the lanes. Calling it again
    /// once ready does nothing.
    /// Concurrent callers wait for the first load instead of repeating it.
    pub async fn preload(&self) -> Result<()> {
        let mut slot = self.ready.write().await;
        if slot.is_some() {
            return Ok(());
        }
        for (difficulty, id) in self.config.missing_models() {
            tracing::warn!(%difficulty, model = id, "difficulty uses a model that is not configured");
        }

        let models = self.config.models.clone();
        let registry = blocking(move || ModelRegistry::load(models.iter())).await??;
        self.install(&mut slot, registry)
    }

    /// Starts the lanes with models that were loaded or built elsewhere,
    /// replacing any running ones.
    pub async fn preload_with(&self, registry: ModelRegistry) -> Result<()> {
        let mut slot = self.ready.write().await;
        self.install(&mut slot, registry)
    }

    fn install(&self, slot: &mut Option<Arc<Ready>>, registry: ModelRegistry) -> Result<()> {
        let engine = ExternalEngine::new(self.config.engine.clone());
        self.check_engine(&engine);
        let tablebase = Tablebase::from_config(&self.config.tablebase)?;

        if let Some(previous) = slot.take() {
            previous.governor.shutdown();
        }
        let models = registry.len();
        *slot = Some(Arc::new(Ready {
            strategies: Arc::new(Strategies {
                registry: Arc::new(registry),
                engine,
                tablebase,
            }),
            governor: Governor::start(&self.config.governor),
        }));
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(models, generation, "predictor ready");
        Ok(())
    }

    fn check_engine(&self, engine: &ExternalEngine) {
        let uses_engine = self
            .config
            .difficulty
            .plans()
            .any(|(_, plan)| plan.kind() == StrategyKind::ExternalEngine);
        if !uses_engine {
            return;
        }
        match engine.binary() {
            Ok(path) if path.is_file() => {
                tracing::info!(path = %path.display(), "engine resolved");
            }
            Ok(path) => tracing::warn!(path = %path.display(), "engine binary not found"),
            Err(e) => tracing::warn!(error = %e, "engine unavailable"),
        }
    }

    /// Stops the lanes and releases the models. Requests already running
    /// finish; queued ones fail with [`PredictError::ShuttingDown`].
    pub async fn shutdown(&self) {
        if let Some(ready) = self.ready.write().await.take() {
            ready.governor.shutdown();
            tracing::info!("predictor shut down");
        }
    }

    pub async fn get_best_move<S: AsRef<str>>(
        &self,
        fen: &str,
        history: &[S],
        difficulty: Difficulty,
    ) -> Result<MoveDetail> {
        Ok(self.predict(fen, history, difficulty).await?.mv)
    }

    /// The move the strongest tier would play.
    pub async fn get_move_hint<S: AsRef<str>>(&self, fen: &str, history: &[S]) -> Result<MoveDetail> {
        self.get_best_move(fen, history, Difficulty::Master).await
    }

    /// `history` holds the game's moves from the standard start, SAN or UCI.
    pub async fn predict<S: AsRef<str>>(
        &self,
        fen: &str,
        history: &[S],
        difficulty: Difficulty,
    ) -> Result<Prediction> {
        let position = Position::from_fen(fen)?;
        let (_, history) =
            MoveHistory::replay(&Position::startpos(), history.iter().map(|m| m.as_ref()))?;
        self.predict_position(position, history, difficulty).await
    }

    pub async fn predict_position(
        &self,
        position: Position,
        history: MoveHistory,
        difficulty: Difficulty,
    ) -> Result<Prediction> {
        let ready = self
            .ready
            .read()
            .await
            .clone()
            .ok_or(PredictError::NotReady)?;

        let legal = position.legal_move_details();
        if legal.is_empty() {
            return Err(PredictError::NoLegalMove {
                fen: position.to_fen(),
            });
        }

        let plan = select(difficulty, &self.config.difficulty);
        let kind = plan.kind();
        tracing::debug!(%difficulty, strategy = %kind, legal = legal.len(), "strategy selected");

        let request = PredictionRequest {
            position,
            history,
            difficulty,
            plan,
        };
        let job = request.execute(ready.strategies.clone(), legal);
        ready.governor.submit(kind, job)?.await
    }
}

impl PredictionRequest {
    async fn execute(self, strategies: Arc<Strategies>, legal: Vec<MoveDetail>) -> Result<Prediction> {
        let started = Instant::now();
        let strategy = self.plan.kind();

        let (mv, source) = match legal.as_slice() {
            [only] => (only.clone(), MoveSource::Forced),
            _ => self.run_plan(&strategies, legal).await?,
        };

        tracing::debug!(
            difficulty = %self.difficulty,
            %strategy,
            %source,
            mv = %mv.uci,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "move chosen"
        );
        Ok(Prediction {
            mv,
            difficulty: self.difficulty,
            strategy,
            source,
        })
    }

    async fn run_plan(
        &self,
        strategies: &Strategies,
        legal: Vec<MoveDetail>,
    ) -> Result<(MoveDetail, MoveSource)> {
        match &self.plan {
            StrategyPlan::PolicyOnly { model } => {
                let registry = strategies.registry.clone();
                let id = model.clone();
                let pos = self.position.clone();
                let history = self.history.clone();
                let choice =
                    blocking(move || registry.predict(&id, &pos, &history, &legal)).await??;
                match choice {
                    Some(mv) => Ok((mv, MoveSource::Model)),
                    None => self.fall_back(model),
                }
            }
            StrategyPlan::SearchWithModel {
                depth,
                max_moves,
                models,
                value_model,
            } => {
                let phase = GamePhase::classify(&self.position, self.history.len());
                if phase == GamePhase::Endgame {
                    if let Some(tablebase) = &strategies.tablebase {
                        match tablebase.lookup(&self.position).await {
                            Ok(Some(mv)) => return Ok((mv, MoveSource::Tablebase)),
                            Ok(None) => {}
                            Err(e) => tracing::warn!(error = %e, "tablebase lookup failed, searching instead"),
                        }
                    }
                }
                let policy = models.for_phase(phase).to_string();
                tracing::debug!(?phase, model = %policy, depth, "searching");

                let evaluator = ModelEvaluator::new(
                    strategies.registry.clone(),
                    Some(policy.clone()),
                    value_model.clone(),
                );
                let config = SearchConfig {
                    depth: *depth,
                    max_moves: *max_moves,
                };
                let pos = self.position.clone();
                let history = self.history.clone();
                let outcome =
                    blocking(move || SearchCore::new(evaluator, config).search(&pos, &history))
                        .await??;
                match outcome.best_move {
                    Some(mv) => Ok((mv, MoveSource::Search)),
                    None => self.fall_back(&policy),
                }
            }
            StrategyPlan::ExternalEngine { elo, depth } => {
                let mv = strategies
                    .engine
                    .best_move(&self.position, *elo, *depth)
                    .await?;
                Ok((mv, MoveSource::Engine))
            }
        }
    }

    fn fall_back(&self, model: &str) -> Result<(MoveDetail, MoveSource)> {
        tracing::warn!(model, difficulty = %self.difficulty, "no legal move from strategy, using fallback");
        let mv = fallback_move(&self.position).ok_or_else(|| PredictError::NoLegalMove {
            fen: self.position.to_fen(),
        })?;
        Ok((mv, MoveSource::Fallback))
    }
}

/// Runs CPU-bound work off the async workers. A panic inside resumes in the
/// calling task so the lane reports it.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => Ok(value),
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(_) => Err(PredictError::ShuttingDown),
    }
}

#[cfg(test)]
#[path = "predictor_tests.rs"]
mod predictor_tests;
