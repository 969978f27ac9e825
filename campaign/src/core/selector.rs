//! Deterministic selection of the next batch of pending work.

use crate::core::kind::CampaignKind;
use crate::core::registry::Registry;
use crate::core::types::Task;

/// Tag whose tasks are surfaced first in reading campaigns.
pub const ENTRYPOINT_TAG: &str = "entrypoint";

/// A capped window over the pending tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a> {
    /// Tasks shown, in display order.
    pub items: Vec<&'a Task>,
    /// Size of the full pending subset.
    pub total_pending: usize,
}

impl Selection<'_> {
    /// Pending tasks left out by the cap.
    pub fn remaining(&self) -> usize {
        self.total_pending - self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_pending == 0
    }
}

/// Pending tasks in display order for `kind`.
///
/// Reading campaigns put entrypoint-tagged tasks first; ties keep discovery
/// order. Audit campaigns keep discovery order.
pub fn ordered_pending(registry: &Registry, kind: CampaignKind) -> Vec<&Task> {
    let mut pending: Vec<&Task> = registry.pending().collect();
    if kind == CampaignKind::Read {
        // Stable sort: ties preserve discovery order.
        pending.sort_by_key(|task| !task.has_tag(ENTRYPOINT_TAG));
    }
    pending
}

/// Select up to `kind.display_cap()` pending tasks.
pub fn select_pending(registry: &Registry, kind: CampaignKind) -> Selection<'_> {
    let mut items = ordered_pending(registry, kind);
    let total_pending = items.len();
    items.truncate(kind.display_cap());
    Selection {
        items,
        total_pending,
    }
}
