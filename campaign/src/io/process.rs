//! Helpers for running the worker process with a timeout.

use std::io::Write;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// How a child process ended.
#[derive(Debug)]
pub struct RunOutcome {
    pub status: ExitStatus,
    pub timed_out: bool,
}

/// Run `cmd`, feed `stdin` to it, and wait up to `timeout`.
///
/// stdout/stderr are inherited, not captured: the caller never parses the
/// child's output. On timeout the child is killed and reaped.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), stdin_bytes = stdin.len()))]
pub fn run_with_stdin(mut cmd: Command, stdin: &[u8], timeout: Duration) -> Result<RunOutcome> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    {
        let mut child_stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin was not piped"))?;
        if let Err(err) = child_stdin.write_all(stdin) {
            // The child may exit without reading everything; keep waiting on it.
            warn!(err = %err, "failed to write full stdin");
        }
    }

    let mut timed_out = false;
    let status = match child.wait_timeout(timeout).context("wait for command")? {
        Some(status) => status,
        None => {
            warn!(
                timeout_secs = timeout.as_secs(),
                "command timed out, killing"
            );
            timed_out = true;
            child.kill().context("kill command")?;
            child.wait().context("wait command after kill")?
        }
    };

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(RunOutcome { status, timed_out })
}
