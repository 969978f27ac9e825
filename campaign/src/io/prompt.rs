//! Prompt rendering for the worker and planner invocations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use minijinja::{Environment, context};
use tracing::debug;

use crate::core::kind::CampaignKind;
use crate::io::config::PromptOverrides;

const READ_PLANNER_TEMPLATE: &str = include_str!("prompts/read_planner.md");
const READ_WORKER_TEMPLATE: &str = include_str!("prompts/read_worker.md");
const AUDIT_PLANNER_TEMPLATE: &str = include_str!("prompts/audit_planner.md");
const AUDIT_WORKER_TEMPLATE: &str = include_str!("prompts/audit_worker.md");

/// Which prompt to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    /// One-off prompt asking the worker to scan and `init` the campaign.
    Planner,
    /// Per-iteration prompt; followed by the pending excerpt.
    Worker,
}

/// Values substituted into templates.
#[derive(Debug, Clone)]
pub struct PromptInputs {
    /// Command line the worker should use to call back into the campaign.
    pub manager: String,
    pub root: String,
    pub goal: Option<String>,
}

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
    overrides: PromptOverrides,
    /// Directory that relative override paths resolve against.
    base_dir: PathBuf,
}

impl PromptEngine {
    pub fn new(overrides: PromptOverrides, base_dir: impl Into<PathBuf>) -> Self {
        let mut env = Environment::new();
        env.add_filter("shell_quote", shell_quote);
        Self {
            env,
            overrides,
            base_dir: base_dir.into(),
        }
    }

    /// Engine using only the embedded templates.
    pub fn embedded() -> Self {
        Self::new(PromptOverrides::default(), ".")
    }

    /// Load the template source for `kind`/`role`.
    ///
    /// A configured override that does not exist is a configuration error.
    fn source(&self, kind: CampaignKind, role: PromptRole) -> Result<String> {
        let configured = match role {
            PromptRole::Planner => self.overrides.planner.as_deref(),
            PromptRole::Worker => self.overrides.worker.as_deref(),
        };
        if let Some(path) = configured {
            let path = self.base_dir.join(path);
            return read_template(&path);
        }
        let embedded = match (kind, role) {
            (CampaignKind::Read, PromptRole::Planner) => READ_PLANNER_TEMPLATE,
            (CampaignKind::Read, PromptRole::Worker) => READ_WORKER_TEMPLATE,
            (CampaignKind::Audit, PromptRole::Planner) => AUDIT_PLANNER_TEMPLATE,
            (CampaignKind::Audit, PromptRole::Worker) => AUDIT_WORKER_TEMPLATE,
        };
        Ok(embedded.to_string())
    }

    pub fn render(
        &self,
        kind: CampaignKind,
        role: PromptRole,
        inputs: &PromptInputs,
    ) -> Result<String> {
        let source = self.source(kind, role)?;
        let rendered = self
            .env
            .render_str(
                &source,
                context! {
                    manager => inputs.manager.as_str(),
                    root => inputs.root.as_str(),
                    goal => inputs.goal.as_deref().unwrap_or("security audit"),
                    kind => kind.as_str(),
                    data_dir => kind.data_dir(),
                    view => kind.view_file(),
                },
            )
            .with_context(|| format!("render {} {:?} prompt", kind, role))?;
        debug!(kind = %kind, ?role, bytes = rendered.len(), "prompt rendered");
        Ok(rendered)
    }
}

fn read_template(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(anyhow!("missing prompt template {}", path.display()));
    }
    fs::read_to_string(path).with_context(|| format!("read prompt template {}", path.display()))
}

/// Quote `value` for a POSIX shell command line.
///
/// Values made only of path-safe characters are left bare.
fn shell_quote(value: String) -> String {
    let bare = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:@%=,".contains(c));
    if bare {
        value
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// Join a rendered template and the pending excerpt into one prompt.
pub fn compose_prompt(template: &str, excerpt: &str) -> String {
    format!("{}\n\n---\n\n{}\n", template.trim_end(), excerpt.trim_end())
}
