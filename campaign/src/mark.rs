//! Orchestration for `campaign done` and `campaign remove`.
//!
//! Both follow `load -> transform -> conditional save`: the store and view are
//! rewritten only when the transform changed something.

use anyhow::Result;
use tracing::{info, warn};

use crate::core::registry::{DoneSummary, RemoveSummary};
use crate::io::init::CampaignPaths;
use crate::io::registry_store::{load_existing, persist};

/// Mark `files` completed and persist if anything transitioned.
pub fn mark_done<S: AsRef<str>>(paths: &CampaignPaths, files: &[S]) -> Result<DoneSummary> {
    let mut registry = load_existing(paths)?;
    let summary = registry.mark_done(files);
    for path in &summary.unknown {
        warn!(path = %path, "path is not part of the campaign");
    }
    if summary.changed() {
        persist(paths, &registry)?;
        info!(updated = summary.updated.len(), "tasks marked completed");
    }
    Ok(summary)
}

/// Remove tasks matching any of `patterns` and persist if any were removed.
pub fn remove_matching<S: AsRef<str>>(
    paths: &CampaignPaths,
    patterns: &[S],
) -> Result<RemoveSummary> {
    let mut registry = load_existing(paths)?;
    let summary = registry.remove_matching(patterns);
    if summary.changed() {
        persist(paths, &registry)?;
        info!(
            removed = summary.removed.len(),
            remaining = summary.remaining,
            "tasks removed"
        );
    }
    Ok(summary)
}
