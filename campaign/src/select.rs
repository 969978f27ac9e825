//! Selection provider for `campaign next` and the loop controller.

use anyhow::Result;

use crate::core::kind::CampaignKind;
use crate::core::registry::Registry;
use crate::core::selector::select_pending;
use crate::core::view::{audit_entry, pending_line};
use crate::io::init::CampaignPaths;
use crate::io::prompt::{PromptEngine, PromptInputs, PromptRole, compose_prompt};
use crate::io::registry_store::load_existing;

/// Printed by `next` when nothing is pending.
pub const COMPLETE_MESSAGE: &str = "All tasks completed!";

/// Structured outcome of a `next` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// No pending tasks remain.
    Complete,
    /// Worker-facing excerpt of the pending tasks.
    Pending {
        excerpt: String,
        total_pending: usize,
    },
}

/// Render the capped pending excerpt for `registry`. Does not mutate anything.
pub fn next_outcome(registry: &Registry, kind: CampaignKind) -> NextOutcome {
    let selection = select_pending(registry, kind);
    if selection.is_empty() {
        return NextOutcome::Complete;
    }
    let view_hint = format!("{}/{}", kind.data_dir(), kind.view_file());
    let mut lines = Vec::new();
    match kind {
        CampaignKind::Read => {
            lines.push("--- Pending (excerpt) ---".to_string());
            lines.extend(
                selection
                    .items
                    .iter()
                    .map(|task| pending_line(task, kind)),
            );
            if selection.remaining() > 0 {
                lines.push(String::new());
                lines.push(format!(
                    "... ({} more pending; read {} for the full list)",
                    selection.remaining(),
                    view_hint
                ));
            }
            lines.push("-------------------------".to_string());
        }
        CampaignKind::Audit => {
            lines.push(format!(
                "Pending targets this round: {}",
                selection.total_pending
            ));
            lines.push("Pick one target file from the list below:".to_string());
            lines.push(String::new());
            lines.extend(selection.items.iter().map(|task| audit_entry(task)));
            if selection.remaining() > 0 {
                lines.push(format!(
                    "- ...({} more, see {})",
                    selection.remaining(),
                    view_hint
                ));
            }
        }
    }
    NextOutcome::Pending {
        excerpt: lines.join("\n"),
        total_pending: selection.total_pending,
    }
}

/// Load the campaign and compute its next excerpt.
pub fn next_from_root(paths: &CampaignPaths) -> Result<NextOutcome> {
    let registry = load_existing(paths)?;
    Ok(next_outcome(&registry, paths.kind))
}

/// Text printed by `campaign next`.
///
/// Audit campaigns prepend the rendered worker prompt so the worker sees its
/// instructions next to the candidate list.
pub fn render_next(
    paths: &CampaignPaths,
    engine: &PromptEngine,
    inputs: &PromptInputs,
) -> Result<String> {
    let registry = load_existing(paths)?;
    match next_outcome(&registry, paths.kind) {
        NextOutcome::Complete => Ok(COMPLETE_MESSAGE.to_string()),
        NextOutcome::Pending { excerpt, .. } => match paths.kind {
            CampaignKind::Read => Ok(excerpt),
            CampaignKind::Audit => {
                let inputs = PromptInputs {
                    goal: registry.goal.clone().or_else(|| inputs.goal.clone()),
                    ..inputs.clone()
                };
                let template = engine.render(paths.kind, PromptRole::Worker, &inputs)?;
                Ok(compose_prompt(&template, &excerpt))
            }
        },
    }
}
