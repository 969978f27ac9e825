//! Test-only helpers for building registries, file trees and scripted workers.

use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use tempfile::TempDir;

use crate::core::kind::CampaignKind;
use crate::core::registry::Registry;
use crate::core::types::{Task, TaskStatus};
use crate::io::worker::{DispatchRequest, Worker};

/// Create a task with no tags and no reason.
pub fn task(path: &str, status: TaskStatus) -> Task {
    Task {
        path: path.to_string(),
        reason: None,
        status,
        tags: BTreeSet::new(),
    }
}

/// Create a task carrying `tags`.
pub fn tagged_task(path: &str, status: TaskStatus, tags: &[&str]) -> Task {
    Task {
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        ..task(path, status)
    }
}

/// Deterministic code-reading registry rooted at `/repo`.
pub fn registry_with(targets: Vec<Task>) -> Registry {
    Registry {
        created_at: Some("2025-01-01 00:00:00".to_string()),
        generated_at: None,
        goal: None,
        ignored_dirs: Some(BTreeSet::from([".git".to_string()])),
        root: "/repo".to_string(),
        stacks: None,
        targets,
    }
}

/// Deterministic security-audit registry rooted at `/repo`.
pub fn audit_registry_with(targets: Vec<Task>) -> Registry {
    Registry {
        created_at: None,
        generated_at: Some("2025-01-01 00:00:00".to_string()),
        goal: CampaignKind::Audit.default_goal().map(str::to_string),
        ignored_dirs: Some(BTreeSet::from([
            ".git".to_string(),
            "node_modules".to_string(),
        ])),
        root: "/repo".to_string(),
        stacks: Some(BTreeSet::from(["python".to_string()])),
        targets,
    }
}

/// Temporary directory populated with empty files.
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    /// Create every relative path in `files` (parents included).
    pub fn new(files: &[&str]) -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        for file in files {
            let path = dir.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            fs::write(&path, b"").with_context(|| format!("write {}", path.display()))?;
        }
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// One scripted reaction to a dispatch.
pub type ScriptedAction = Box<dyn FnOnce(&DispatchRequest) -> Result<()>>;

/// Box a closure as a [`ScriptedAction`].
pub fn action(f: impl FnOnce(&DispatchRequest) -> Result<()> + 'static) -> ScriptedAction {
    Box::new(f)
}

/// Worker that replays queued actions and records every prompt it receives.
///
/// Dispatching past the end of the script is an error.
pub struct ScriptedWorker {
    actions: Mutex<VecDeque<ScriptedAction>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedWorker {
    pub fn new(actions: Vec<ScriptedAction>) -> Self {
        Self {
            actions: Mutex::new(actions.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Worker that does nothing for `count` dispatches.
    pub fn idle(count: usize) -> Self {
        Self::new((0..count).map(|_| action(|_| Ok(()))).collect())
    }

    /// Prompts received so far, in dispatch order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

impl Worker for ScriptedWorker {
    fn dispatch(&self, request: &DispatchRequest) -> Result<()> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }
        let next = match self.actions.lock() {
            Ok(mut actions) => actions.pop_front(),
            Err(_) => bail!("scripted worker poisoned"),
        };
        match next {
            Some(action) => action(request),
            None => bail!("scripted worker has no action left"),
        }
    }
}
