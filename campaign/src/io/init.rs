//! Campaign layout and the `init` operation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Local;
use tracing::{debug, info};

use crate::core::filters::ScanFilters;
use crate::core::invariants::validate_invariants;
use crate::core::kind::CampaignKind;
use crate::core::registry::Registry;
use crate::io::config::{CampaignConfig, write_config};
use crate::io::registry_store::persist;
use crate::io::scanner::scan_files;

/// Timestamp format stamped into registries and reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// All canonical paths of a campaign under its root.
#[derive(Debug, Clone)]
pub struct CampaignPaths {
    pub kind: CampaignKind,
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub state_path: PathBuf,
    pub view_path: PathBuf,
    pub report_path: PathBuf,
    pub config_path: PathBuf,
}

impl CampaignPaths {
    pub fn new(root: impl Into<PathBuf>, kind: CampaignKind) -> Self {
        let root = root.into();
        let data_dir = root.join(kind.data_dir());
        Self {
            kind,
            root,
            state_path: data_dir.join(kind.state_file()),
            view_path: data_dir.join(kind.view_file()),
            report_path: data_dir.join("SECURITY_AUDIT_REPORT.md"),
            config_path: data_dir.join("config.toml"),
            data_dir,
        }
    }
}

/// Options for `init_campaign`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub filters: ScanFilters,
}

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Scan `paths.root`, classify every file and overwrite the campaign store.
///
/// Re-running replaces the whole task set; prior completion state is
/// discarded. A default `config.toml` is written on first init and left
/// alone afterwards.
pub fn init_campaign(paths: &CampaignPaths, options: &InitOptions) -> Result<Registry> {
    debug!(root = %paths.root.display(), kind = %paths.kind, "initializing campaign");
    let files = scan_files(&paths.root, &options.filters)?;
    let registry = Registry::from_scan(
        paths.kind,
        paths.root.display().to_string(),
        now_timestamp(),
        options.filters.ignored_dirs.clone(),
        files,
    );
    let errors = validate_invariants(&registry);
    if !errors.is_empty() {
        bail!("scan produced an invalid registry: {}", errors.join("; "));
    }
    create_dir(&paths.data_dir)?;
    if !paths.config_path.exists() {
        write_config(&paths.config_path, &CampaignConfig::default())?;
    }
    persist(paths, &registry)?;
    info!(targets = registry.targets.len(), "campaign initialized");
    Ok(registry)
}

pub(crate) fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("create directory {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TaskStatus;
    use crate::io::config::load_config;
    use crate::io::registry_store::{load_registry, save_registry};
    use crate::test_support::TestTree;

    fn options(kind: CampaignKind) -> InitOptions {
        InitOptions {
            filters: ScanFilters::from_csv(kind, "", None, ""),
        }
    }

    /// Verifies init over a small tree yields one classified task per file.
    #[test]
    fn init_creates_classified_pending_tasks() {
        let tree = TestTree::new(&["app/main.py", "lib/util.py"]).expect("tree");
        let paths = CampaignPaths::new(tree.path(), CampaignKind::Read);

        let registry = init_campaign(&paths, &options(CampaignKind::Read)).expect("init");

        let summary: Vec<(&str, Vec<&str>)> = registry
            .targets
            .iter()
            .map(|task| {
                (
                    task.path.as_str(),
                    task.tags.iter().map(String::as_str).collect(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("app/main.py", vec!["entrypoint"]),
                ("lib/util.py", vec!["utils"]),
            ]
        );
        assert!(paths.state_path.is_file());
        assert!(paths.view_path.is_file());
        assert_eq!(load_registry(&paths).expect("load"), registry);
    }

    /// Verifies re-init discards completion state and never ingests its own data dir.
    #[test]
    fn reinit_discards_progress() {
        let tree = TestTree::new(&["a.py", "b.py"]).expect("tree");
        let paths = CampaignPaths::new(tree.path(), CampaignKind::Audit);
        let opts = options(CampaignKind::Audit);

        let mut registry = init_campaign(&paths, &opts).expect("init");
        registry.mark_done(&["a.py"]);
        save_registry(&paths, &registry).expect("save");

        let fresh = init_campaign(&paths, &opts).expect("re-init");
        let listed: Vec<&str> = fresh.targets.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(listed, vec!["a.py", "b.py"]);
        assert!(fresh.targets.iter().all(|t| t.status == TaskStatus::Pending));
    }

    #[test]
    fn first_init_writes_default_config_and_keeps_edits() {
        let tree = TestTree::new(&["a.py"]).expect("tree");
        let paths = CampaignPaths::new(tree.path(), CampaignKind::Read);
        let opts = options(CampaignKind::Read);

        init_campaign(&paths, &opts).expect("init");
        assert_eq!(
            load_config(&paths.config_path).expect("load"),
            CampaignConfig::default()
        );

        let edited = CampaignConfig {
            idle_secs: 7,
            ..CampaignConfig::default()
        };
        write_config(&paths.config_path, &edited).expect("edit");
        init_campaign(&paths, &opts).expect("re-init");
        assert_eq!(load_config(&paths.config_path).expect("load"), edited);
    }

    /// A backslash inside a file name must not produce a store the loader rejects.
    #[cfg(unix)]
    #[test]
    fn backslash_names_yield_a_loadable_store() {
        let tree = TestTree::new(&["ok.py", "weird\\name.py"]).expect("tree");
        let paths = CampaignPaths::new(tree.path(), CampaignKind::Audit);

        let registry = init_campaign(&paths, &options(CampaignKind::Audit)).expect("init");
        let listed: Vec<&str> = registry.targets.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(listed, vec!["ok.py", "weird/name.py"]);
        assert_eq!(load_registry(&paths).expect("load"), registry);
    }
}
