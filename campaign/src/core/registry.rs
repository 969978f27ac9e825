//! The campaign registry and its pure state transitions.
//!
//! Every command follows `load -> transform -> conditional save`. The
//! transforms here never touch disk; they report what changed so the caller
//! can decide whether a write is needed.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::classifier::classify;
use crate::core::filters::extension_of;
use crate::core::kind::CampaignKind;
use crate::core::types::{INITIAL_REASON, Task, TaskStatus};

/// Authoritative campaign state.
///
/// Fields are declared in lexicographic order so the serialized store has
/// sorted keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Initialization stamp of reading campaigns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Initialization stamp of audit campaigns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored_dirs: Option<BTreeSet<String>>,
    /// Absolute path of the scanned directory.
    pub root: String,
    /// Distinct file extensions observed by the scan (informational).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacks: Option<BTreeSet<String>>,
    /// Tasks in discovery order.
    pub targets: Vec<Task>,
}

/// Completed versus total task counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completion percentage; zero for an empty registry.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Outcome of [`Registry::mark_done`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoneSummary {
    /// Paths transitioned from pending to completed by this call.
    pub updated: Vec<String>,
    /// Paths that were already completed (no-op).
    pub already_completed: Vec<String>,
    /// Paths not present in the registry.
    pub unknown: Vec<String>,
}

impl DoneSummary {
    pub fn changed(&self) -> bool {
        !self.updated.is_empty()
    }
}

/// Outcome of [`Registry::remove_matching`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveSummary {
    pub removed: Vec<String>,
    pub remaining: usize,
}

impl RemoveSummary {
    pub fn changed(&self) -> bool {
        !self.removed.is_empty()
    }
}

impl Registry {
    /// Build a fresh registry from scanned paths; every task starts pending.
    pub fn from_scan(
        kind: CampaignKind,
        root: impl Into<String>,
        timestamp: impl Into<String>,
        ignored_dirs: BTreeSet<String>,
        paths: Vec<String>,
    ) -> Self {
        let rules = kind.rules();
        let reason = match kind {
            CampaignKind::Read => None,
            CampaignKind::Audit => Some(INITIAL_REASON.to_string()),
        };
        let targets: Vec<Task> = paths
            .into_iter()
            .map(|path| Task {
                tags: classify(&path, rules),
                reason: reason.clone(),
                status: TaskStatus::Pending,
                path,
            })
            .collect();

        let timestamp = timestamp.into();
        let (created_at, generated_at, stacks) = match kind {
            CampaignKind::Read => (Some(timestamp), None, None),
            CampaignKind::Audit => {
                let stacks: BTreeSet<String> = targets
                    .iter()
                    .filter_map(|task| extension_of(&task.path))
                    .map(str::to_string)
                    .collect();
                (None, Some(timestamp), Some(stacks))
            }
        };

        Self {
            created_at,
            generated_at,
            goal: kind.default_goal().map(str::to_string),
            ignored_dirs: Some(ignored_dirs),
            root: root.into(),
            stacks,
            targets,
        }
    }

    /// Initialization stamp regardless of campaign kind.
    pub fn timestamp(&self) -> &str {
        self.generated_at
            .as_deref()
            .or(self.created_at.as_deref())
            .unwrap_or("")
    }

    pub fn pending(&self) -> impl Iterator<Item = &Task> {
        self.targets.iter().filter(|task| task.is_pending())
    }

    pub fn completed(&self) -> impl Iterator<Item = &Task> {
        self.targets.iter().filter(|task| !task.is_pending())
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.completed().count(),
            total: self.targets.len(),
        }
    }

    /// True iff there is at least one task and none is pending.
    ///
    /// An empty registry is never complete: it is either uninitialized or was
    /// emptied by `remove`.
    pub fn is_complete(&self) -> bool {
        !self.targets.is_empty() && self.pending().next().is_none()
    }

    /// Transition the named paths to completed.
    ///
    /// Paths are trimmed and `\` is normalized to `/` before lookup.
    /// Re-marking a completed path is a no-op and unknown paths are reported,
    /// not rejected.
    pub fn mark_done<S: AsRef<str>>(&mut self, paths: &[S]) -> DoneSummary {
        let index: HashMap<String, usize> = self
            .targets
            .iter()
            .enumerate()
            .map(|(idx, task)| (task.path.clone(), idx))
            .collect();

        let mut summary = DoneSummary::default();
        for raw in paths {
            let path = normalize_path(raw.as_ref());
            match index.get(&path) {
                Some(&idx) => {
                    let task = &mut self.targets[idx];
                    if task.is_pending() {
                        task.status = TaskStatus::Completed;
                        summary.updated.push(path);
                    } else {
                        summary.already_completed.push(path);
                    }
                }
                None => summary.unknown.push(path),
            }
        }
        summary
    }

    /// Delete every task whose path contains any of `patterns`.
    ///
    /// Blank patterns are ignored; they would otherwise match every task.
    pub fn remove_matching<S: AsRef<str>>(&mut self, patterns: &[S]) -> RemoveSummary {
        let patterns: Vec<&str> = patterns
            .iter()
            .map(AsRef::as_ref)
            .filter(|pattern| !pattern.trim().is_empty())
            .collect();

        let mut removed = Vec::new();
        self.targets.retain(|task| {
            let hit = patterns.iter().any(|pattern| task.path.contains(pattern));
            if hit {
                removed.push(task.path.clone());
            }
            !hit
        });

        RemoveSummary {
            removed,
            remaining: self.targets.len(),
        }
    }
}

fn normalize_path(raw: &str) -> String {
    raw.trim().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{registry_with, task};

    fn statuses(registry: &Registry) -> Vec<(&str, TaskStatus)> {
        registry
            .targets
            .iter()
            .map(|task| (task.path.as_str(), task.status))
            .collect()
    }

    #[test]
    fn from_scan_classifies_and_starts_pending() {
        let registry = Registry::from_scan(
            CampaignKind::Read,
            "/repo",
            "2025-01-01 00:00:00",
            BTreeSet::new(),
            vec!["app/main.py".to_string(), "lib/util.py".to_string()],
        );
        assert_eq!(registry.created_at.as_deref(), Some("2025-01-01 00:00:00"));
        assert!(registry.generated_at.is_none());
        assert!(registry.targets.iter().all(Task::is_pending));
        assert!(registry.targets[0].has_tag("entrypoint"));
        assert!(registry.targets[1].has_tag("utils"));
        assert!(registry.targets[0].reason.is_none());
    }

    #[test]
    fn audit_scan_records_stacks_goal_and_reason() {
        let registry = Registry::from_scan(
            CampaignKind::Audit,
            "/repo",
            "2025-01-01 00:00:00",
            BTreeSet::new(),
            vec![
                "a.py".to_string(),
                "b.py".to_string(),
                "c.go".to_string(),
                "Makefile".to_string(),
            ],
        );
        let stacks: Vec<_> = registry.stacks.clone().expect("stacks").into_iter().collect();
        assert_eq!(stacks, vec![".go", ".py"]);
        assert_eq!(registry.goal.as_deref(), Some("Comprehensive security audit"));
        assert_eq!(registry.targets[0].reason.as_deref(), Some(INITIAL_REASON));
        assert_eq!(registry.timestamp(), "2025-01-01 00:00:00");
    }

    #[test]
    fn pending_and_completed_partition_targets() {
        let registry = registry_with(vec![
            task("a.py", TaskStatus::Pending),
            task("b.py", TaskStatus::Completed),
            task("c.py", TaskStatus::Pending),
        ]);
        let pending: BTreeSet<_> = registry.pending().map(|t| t.path.as_str()).collect();
        let completed: BTreeSet<_> = registry.completed().map(|t| t.path.as_str()).collect();
        assert!(pending.is_disjoint(&completed));
        assert_eq!(pending.len() + completed.len(), registry.targets.len());
        assert_eq!(registry.progress(), Progress { completed: 1, total: 3 });
    }

    #[test]
    fn mark_done_is_idempotent() {
        let mut registry = registry_with(vec![
            task("a.py", TaskStatus::Pending),
            task("b.py", TaskStatus::Pending),
        ]);

        let first = registry.mark_done(&["a.py"]);
        assert_eq!(first.updated, vec!["a.py"]);
        let after_first = registry.clone();

        let second = registry.mark_done(&["a.py"]);
        assert!(!second.changed());
        assert_eq!(second.already_completed, vec!["a.py"]);
        assert_eq!(registry, after_first);
    }

    #[test]
    fn mark_done_reports_unknown_paths_without_failing() {
        let mut registry = registry_with(vec![task("src/a.py", TaskStatus::Pending)]);
        let summary = registry.mark_done(&["missing/path.py", " src\\a.py "]);
        assert_eq!(summary.unknown, vec!["missing/path.py"]);
        assert_eq!(summary.updated, vec!["src/a.py"]);
    }

    #[test]
    fn completion_requires_non_empty_targets() {
        let mut registry = registry_with(Vec::new());
        assert!(!registry.is_complete());

        registry.targets.push(task("a.py", TaskStatus::Pending));
        assert!(!registry.is_complete());

        registry.mark_done(&["a.py"]);
        assert!(registry.is_complete());
    }

    #[test]
    fn two_pending_one_completed_scenario() {
        let mut registry = registry_with(vec![
            task("a.py", TaskStatus::Pending),
            task("b.py", TaskStatus::Completed),
            task("c.py", TaskStatus::Pending),
        ]);
        assert!(!registry.is_complete());
        let summary = registry.mark_done(&["a.py", "c.py"]);
        assert_eq!(summary.updated.len(), 2);
        assert!(registry.is_complete());
    }

    #[test]
    fn remove_matches_substrings() {
        let mut registry = registry_with(vec![
            task("src/test_foo.py", TaskStatus::Pending),
            task("src/bar.py", TaskStatus::Completed),
        ]);
        let summary = registry.remove_matching(&["test_"]);
        assert_eq!(summary.removed, vec!["src/test_foo.py"]);
        assert_eq!(summary.remaining, 1);
        assert_eq!(statuses(&registry), vec![("src/bar.py", TaskStatus::Completed)]);
    }

    #[test]
    fn remove_ignores_blank_patterns() {
        let mut registry = registry_with(vec![task("a.py", TaskStatus::Pending)]);
        let summary = registry.remove_matching(&["", "  "]);
        assert!(!summary.changed());
        assert_eq!(registry.targets.len(), 1);
    }

    #[test]
    fn removing_everything_leaves_registry_incomplete() {
        let mut registry = registry_with(vec![task("a.py", TaskStatus::Completed)]);
        assert!(registry.is_complete());
        registry.remove_matching(&["a"]);
        assert!(!registry.is_complete());
    }
}
