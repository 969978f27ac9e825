//! Campaign configuration stored under `<data_dir>/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::io::registry_store::write_atomic;

/// Loop configuration (TOML).
///
/// This file is intended to be edited by humans. Missing fields default to
/// the values below; a missing file means all defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CampaignConfig {
    /// Wall-clock budget for one worker invocation, in seconds.
    pub iteration_timeout_secs: u64,

    /// Pause between worker invocations, in seconds.
    pub idle_secs: u64,

    /// Stop the loop after this many dispatches (unbounded when absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,

    pub worker: WorkerConfig,

    pub prompts: PromptOverrides,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Program and fixed arguments; the prompt is delivered on stdin.
    pub command: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "claude".to_string(),
                "code".to_string(),
                "-p".to_string(),
                "--dangerously-skip-permissions".to_string(),
            ],
        }
    }
}

/// Optional template files replacing the embedded prompts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PromptOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planner: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<PathBuf>,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            iteration_timeout_secs: 30 * 60,
            idle_secs: 2,
            max_iterations: None,
            worker: WorkerConfig::default(),
            prompts: PromptOverrides::default(),
        }
    }
}

impl CampaignConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iteration_timeout_secs == 0 {
            return Err(anyhow!("iteration_timeout_secs must be > 0"));
        }
        if self.max_iterations == Some(0) {
            return Err(anyhow!("max_iterations must be > 0 when set"));
        }
        if self.worker.command.is_empty() || self.worker.command[0].trim().is_empty() {
            return Err(anyhow!("worker.command must be a non-empty array"));
        }
        Ok(())
    }

    pub fn iteration_timeout(&self) -> Duration {
        Duration::from_secs(self.iteration_timeout_secs)
    }

    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `CampaignConfig::default()`.
pub fn load_config(path: &Path) -> Result<CampaignConfig> {
    if !path.exists() {
        let cfg = CampaignConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CampaignConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &CampaignConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}
