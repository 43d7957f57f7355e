//! One engine subprocess with piped stdio.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as ProcessCommand};

use crate::error::{EngineError, Result};
use crate::protocol::Command;

pub struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    pid: Option<u32>,
}

impl EngineProcess {
    /// Starts `path` after checking that it is an executable file.
    /// Stderr is drained into `warn!` events for the lifetime of the process.
    pub fn spawn(path: &Path) -> Result<Self> {
        check_executable(path)?;

        let mut child = ProcessCommand::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(path, e.to_string()))?;

        let pid = child.id();
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_error(path, "stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_error(path, "stdout not captured".into()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::warn!(pid, line = %line, "engine stderr");
                }
            });
        }

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            pid,
        })
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub async fn send(&mut self, command: &Command) -> Result<()> {
        tracing::trace!(pid = self.pid, %command, "to engine");
        self.stdin
            .write_all(format!("{command}\n").as_bytes())
            .await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Next stdout line, `None` once the engine closed its output.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.stdout.next_line().await?)
    }

    /// Kills the process if it is still running and reaps it.
    pub async fn terminate(mut self) {
        if let Err(e) = self.child.start_kill() {
            // Already exited.
            tracing::trace!(pid = self.pid, error = %e, "kill skipped");
        }
        match self.child.wait().await {
            Ok(status) => tracing::debug!(pid = self.pid, %status, "engine reaped"),
            Err(e) => tracing::warn!(pid = self.pid, error = %e, "failed to reap engine"),
        }
    }
}

fn spawn_error(path: &Path, reason: String) -> EngineError {
    EngineError::Spawn {
        path: path.to_path_buf(),
        reason,
    }
}

fn check_executable(path: &Path) -> Result<()> {
    let meta = std::fs::metadata(path).map_err(|e| spawn_error(path, e.to_string()))?;
    if !meta.is_file() {
        return Err(spawn_error(path, "not a file".into()));
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 == 0 {
            return Err(spawn_error(path, "not executable".into()));
        }
    }
    Ok(())
}
