use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_core::{parse_uci_move, MoveDetail, Position};
use serde::Deserialize;
use tokio::time::Instant;

use crate::error::{EngineError, Result};
use crate::process::EngineProcess;
use crate::protocol::{Command, Event, UciParser};
use crate::EngineState;

/// Per-platform locations of one file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineBinary {
    pub linux: Option<PathBuf>,
    pub macos: Option<PathBuf>,
    pub windows: Option<PathBuf>,
}

impl EngineBinary {
    /// The same path on every platform.
    pub fn everywhere(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            linux: Some(path.clone()),
            macos: Some(path.clone()),
            windows: Some(path),
        }
    }

    pub fn for_host(&self) -> Option<&Path> {
        let path = if cfg!(target_os = "windows") {
            &self.windows
        } else if cfg!(target_os = "macos") {
            &self.macos
        } else {
            &self.linux
        };
        path.as_deref()
    }

    pub fn map_paths(&mut self, mut f: impl FnMut(&Path) -> PathBuf) {
        for slot in [&mut self.linux, &mut self.macos, &mut self.windows] {
            if let Some(path) = slot.as_mut() {
                *path = f(path);
            }
        }
    }
}

/// The `[engine]` section of the predictor configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(flatten)]
    pub binary: EngineBinary,
    pub syzygy_linux: Option<PathBuf>,
    pub syzygy_macos: Option<PathBuf>,
    pub syzygy_windows: Option<PathBuf>,
    pub threads: u32,
    pub hash_mb: u32,
    pub timeout_secs: u64,
    pub syzygy_probe_depth: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: EngineBinary::default(),
            syzygy_linux: None,
            syzygy_macos: None,
            syzygy_windows: None,
            threads: 1,
            hash_mb: 128,
            timeout_secs: 30,
            syzygy_probe_depth: 7,
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn syzygy(&self) -> EngineBinary {
        EngineBinary {
            linux: self.syzygy_linux.clone(),
            macos: self.syzygy_macos.clone(),
            windows: self.syzygy_windows.clone(),
        }
    }

    /// Rewrites every configured path, e.g. to anchor it at a config directory.
    pub fn map_paths(&mut self, mut f: impl FnMut(&Path) -> PathBuf) {
        self.binary.map_paths(&mut f);
        for slot in [
            &mut self.syzygy_linux,
            &mut self.syzygy_macos,
            &mut self.syzygy_windows,
        ] {
            if let Some(path) = slot.as_mut() {
                *path = f(path);
            }
        }
    }
}

/// Runs one engine process per [`ExternalEngine::best_move`] call.
#[derive(Clone, Debug)]
pub struct ExternalEngine {
    config: EngineConfig,
    timeout: Duration,
}

impl ExternalEngine {
    pub fn new(config: EngineConfig) -> Self {
        let timeout = config.timeout();
        Self { config, timeout }
    }

    /// Overrides the configured wall-clock limit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Path of the engine binary for this platform.
    pub fn binary(&self) -> Result<PathBuf> {
        self.config
            .binary
            .for_host()
            .map(Path::to_path_buf)
            .ok_or_else(|| EngineError::Spawn {
                path: PathBuf::new(),
                reason: format!("no engine binary configured for {}", std::env::consts::OS),
            })
    }

    /// Asks the engine for its move in `pos`, playing at `elo` to `depth` plies.
    ///
    /// The process is killed and reaped before this returns, whatever the outcome.
    pub async fn best_move(&self, pos: &Position, elo: u32, depth: u8) -> Result<MoveDetail> {
        let binary = self.binary()?;
        let deadline = Instant::now() + self.timeout;
        let mut process = EngineProcess::spawn(&binary)?;
        let pid = process.pid();
        tracing::debug!(pid, binary = %binary.display(), state = %EngineState::Spawned, "engine started");

        let mut state = EngineState::Spawned;
        let conversation = tokio::time::timeout_at(
            deadline,
            self.converse(&mut process, &mut state, pos, elo, depth),
        )
        .await;

        let result = match conversation {
            Ok(Ok(token)) => match validate(pos, &token) {
                Ok(detail) => {
                    state = EngineState::Resolved;
                    Ok(detail)
                }
                Err(e) => {
                    state = EngineState::Rejected;
                    Err(e)
                }
            },
            Ok(Err(e)) => {
                if matches!(e, EngineError::Crashed(_)) {
                    state = EngineState::Crashed;
                } else {
                    state = EngineState::Rejected;
                }
                Err(e)
            }
            Err(_) => {
                tracing::warn!(pid, timeout_ms = self.timeout.as_millis() as u64, "engine timed out, killing");
                state = EngineState::TimedOut;
                Err(EngineError::Timeout(self.timeout))
            }
        };

        process.terminate().await;
        tracing::debug!(pid, %state, "engine finished");
        result
    }

    /// Drives the handshake and search, returning the raw `bestmove` token.
    async fn converse(
        &self,
        process: &mut EngineProcess,
        state: &mut EngineState,
        pos: &Position,
        elo: u32,
        depth: u8,
    ) -> Result<String> {
        let mut parser = UciParser::new();

        *state = EngineState::Handshake;
        process.send(&Command::Uci).await?;
        wait_for(process, &mut parser, *state, |e| (e == Event::UciOk).then_some(())).await?;
        process.send(&Command::IsReady).await?;
        wait_for(process, &mut parser, *state, |e| (e == Event::ReadyOk).then_some(())).await?;

        *state = EngineState::Configured;
        for command in self.setup_commands(pos, elo) {
            process.send(&command).await?;
        }

        *state = EngineState::Searching;
        process.send(&Command::GoDepth(depth)).await?;

        *state = EngineState::AwaitingResult;
        let token = wait_for(process, &mut parser, *state, |e| match e {
            Event::BestMove(token) => Some(token),
            _ => None,
        })
        .await?;

        // Still under the caller's deadline. An engine that already left is fine.
        if let Err(e) = process.send(&Command::Quit).await {
            tracing::debug!(pid = process.pid(), error = %e, "quit not delivered");
        }
        Ok(token)
    }

    /// Everything sent between the handshake and `go`, in order.
    pub fn setup_commands(&self, pos: &Position, elo: u32) -> Vec<Command> {
        let mut commands = vec![
            Command::set_option("Threads", self.config.threads),
            Command::set_option("Hash", self.config.hash_mb),
            Command::PositionFen(pos.to_fen()),
        ];
        if let Some(syzygy) = self.config.syzygy().for_host() {
            commands.push(Command::set_option("SyzygyPath", syzygy.display()));
            commands.push(Command::set_option(
                "SyzygyProbeDepth",
                self.config.syzygy_probe_depth,
            ));
        }
        commands.push(Command::set_option("UCI_LimitStrength", true));
        commands.push(Command::set_option("UCI_Elo", elo));
        commands
    }
}

/// Reads lines until `want` accepts an event. End of output means the engine died.
async fn wait_for<T>(
    process: &mut EngineProcess,
    parser: &mut UciParser,
    state: EngineState,
    want: impl Fn(Event) -> Option<T>,
) -> Result<T> {
    loop {
        let Some(line) = process.next_line().await? else {
            return Err(EngineError::Crashed(state));
        };
        let event = parser.feed(&line)?;
        if let Event::Info(info) = &event {
            tracing::debug!(pid = process.pid(), depth = info.depth, score = ?info.score, nodes = info.nodes, "engine info");
        }
        if let Some(found) = want(event) {
            return Ok(found);
        }
    }
}

fn validate(pos: &Position, token: &str) -> Result<MoveDetail> {
    parse_uci_move(pos, token)
        .and_then(|mv| pos.detail(mv))
        .ok_or_else(|| EngineError::IllegalMove {
            mv: token.to_string(),
            fen: pos.to_fen(),
        })
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
