//! Registry load/save with schema + invariant validation, and view sync.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::invariants::validate_invariants;
use crate::core::registry::Registry;
use crate::core::view::render_view;
use crate::io::init::{CampaignPaths, create_dir};

const REGISTRY_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/registry/v1.schema.json"
));

/// Completion state of a campaign as seen on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// No store has been written yet.
    Missing,
    /// The store exists but has no targets.
    Empty,
    /// Number of pending tasks left.
    Pending(usize),
    Complete,
}

impl Completion {
    pub fn is_complete(self) -> bool {
        self == Completion::Complete
    }
}

/// Load and validate the registry (schema + invariants).
pub fn load_registry(paths: &CampaignPaths) -> Result<Registry> {
    let state_path = &paths.state_path;
    debug!(path = %state_path.display(), "loading registry");
    let contents = fs::read_to_string(state_path)
        .with_context(|| format!("read registry {}", state_path.display()))?;
    parse_registry(&contents).with_context(|| format!("load registry {}", state_path.display()))
}

/// Load the registry, turning a missing store into an actionable error.
pub fn load_existing(paths: &CampaignPaths) -> Result<Registry> {
    if !paths.state_path.exists() {
        return Err(anyhow!(
            "no campaign found at {} (run `campaign --kind {} init` first)",
            paths.state_path.display(),
            paths.kind
        ));
    }
    load_registry(paths)
}

fn parse_registry(contents: &str) -> Result<Registry> {
    let value: Value = serde_json::from_str(contents).context("parse registry json")?;
    validate_schema(&value)?;
    let registry: Registry = serde_json::from_value(value).context("deserialize registry")?;
    let errors = validate_invariants(&registry);
    if !errors.is_empty() {
        return Err(anyhow!("registry invariants failed: {}", errors.join("; ")));
    }
    Ok(registry)
}

/// Atomically write the registry store (pretty JSON, sorted keys).
pub fn save_registry(paths: &CampaignPaths, registry: &Registry) -> Result<()> {
    debug!(path = %paths.state_path.display(), targets = registry.targets.len(), "writing registry");
    let mut buf = serde_json::to_string_pretty(registry).context("serialize registry")?;
    buf.push('\n');
    write_atomic(&paths.state_path, &buf)
}

/// Regenerate the human-readable view from `registry`.
pub fn sync_view(paths: &CampaignPaths, registry: &Registry) -> Result<()> {
    let view = render_view(registry, paths.kind);
    write_atomic(&paths.view_path, &view)
}

/// Write the store, then fully regenerate the view.
pub fn persist(paths: &CampaignPaths, registry: &Registry) -> Result<()> {
    save_registry(paths, registry)?;
    sync_view(paths, registry)?;
    info!(view = %paths.view_path.display(), "registry persisted and view regenerated");
    Ok(())
}

/// Inspect completion on disk.
///
/// A store that exists but cannot be read or validated is an error rather
/// than "not complete", so callers looping on this never spin on corruption.
pub fn check_completion(paths: &CampaignPaths) -> Result<Completion> {
    if !paths.state_path.exists() {
        return Ok(Completion::Missing);
    }
    let registry = load_registry(paths)?;
    if registry.targets.is_empty() {
        return Ok(Completion::Empty);
    }
    let pending = registry.pending().count();
    if pending == 0 {
        return Ok(Completion::Complete);
    }
    Ok(Completion::Pending(pending))
}

/// True iff the persisted campaign is complete.
///
/// Missing, empty or unreadable stores all count as not complete.
pub fn is_complete(paths: &CampaignPaths) -> bool {
    match check_completion(paths) {
        Ok(completion) => completion.is_complete(),
        Err(err) => {
            warn!(err = %format!("{err:#}"), "cannot determine completion");
            false
        }
    }
}

fn validate_schema(value: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(REGISTRY_SCHEMA).context("parse registry schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(value) {
        let messages = compiled
            .iter_errors(value)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "registry schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}

pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("path missing parent {}", path.display()))?;
    create_dir(parent)?;
    let file_name = path
        .file_name()
        .with_context(|| format!("path missing file name {}", path.display()))?;
    let tmp_path = parent.join(format!("{}.tmp", file_name.to_string_lossy()));
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
