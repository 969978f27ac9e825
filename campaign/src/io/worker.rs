//! Worker abstraction for agent invocation.
//!
//! The [`Worker`] trait decouples the loop controller from the actual agent
//! backend (by default `claude code -p`). Tests use scripted workers that act
//! on the campaign directly without spawning processes.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{info, instrument, warn};

use crate::io::config::WorkerConfig;
use crate::io::process::run_with_stdin;

/// Parameters for one worker invocation.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// Working directory for the worker process (the campaign root).
    pub workdir: PathBuf,
    /// Prompt text delivered on stdin.
    pub prompt: String,
    /// Maximum time to wait for the worker to exit.
    pub timeout: Duration,
}

/// Abstraction over worker backends.
///
/// A worker is expected to call back into the campaign (`next`, `done`,
/// `report`) on its own; its output is never inspected.
pub trait Worker {
    fn dispatch(&self, request: &DispatchRequest) -> Result<()>;
}

/// Worker that spawns an external command found on `PATH`.
#[derive(Debug, Clone)]
pub struct CommandWorker {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandWorker {
    /// Resolve the configured program on `PATH`.
    ///
    /// A missing executable is a configuration error.
    pub fn locate(config: &WorkerConfig) -> Result<Self> {
        let (name, args) = config
            .command
            .split_first()
            .ok_or_else(|| anyhow!("worker.command must be a non-empty array"))?;
        let program = which::which(name)
            .with_context(|| format!("worker executable '{name}' not found on PATH"))?;
        Ok(Self {
            program,
            args: args.to_vec(),
        })
    }

    /// Resolved executable path.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Worker for CommandWorker {
    #[instrument(skip_all, fields(program = %self.program.display(), timeout_secs = request.timeout.as_secs()))]
    fn dispatch(&self, request: &DispatchRequest) -> Result<()> {
        info!(workdir = %request.workdir.display(), "dispatching worker");
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&request.workdir);

        let outcome = run_with_stdin(cmd, request.prompt.as_bytes(), request.timeout)
            .with_context(|| format!("run worker {}", self.program.display()))?;

        // Failures are logged, not propagated; the loop re-checks completion.
        if outcome.timed_out {
            warn!(timeout_secs = request.timeout.as_secs(), "worker timed out");
        } else if !outcome.status.success() {
            warn!(exit_code = ?outcome.status.code(), "worker exited unsuccessfully");
        }
        Ok(())
    }
}
