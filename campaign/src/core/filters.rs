//! Scan filters: pruned directory names plus extension allow/deny lists.

use std::collections::BTreeSet;

use crate::core::kind::CampaignKind;

/// Filters applied by the filesystem scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilters {
    /// Directory names pruned at any depth.
    pub ignored_dirs: BTreeSet<String>,
    /// If non-empty, only these extensions are kept.
    pub include_exts: BTreeSet<String>,
    /// Extensions always dropped, even when allow-listed.
    pub exclude_exts: BTreeSet<String>,
}

impl ScanFilters {
    /// Build filters for `kind` from raw CSV flags.
    ///
    /// `include_exts = None` means the flag was absent and the kind's default
    /// allow-list applies; `Some("")` disables the allow-list.
    pub fn from_csv(
        kind: CampaignKind,
        ignore_dirs: &str,
        include_exts: Option<&str>,
        exclude_exts: &str,
    ) -> Self {
        let mut ignored_dirs = parse_csv(ignore_dirs);
        ignored_dirs.extend(
            kind.default_ignored_dirs()
                .iter()
                .map(|dir| dir.to_string()),
        );
        let include = include_exts.unwrap_or_else(|| kind.default_include_exts());
        Self {
            ignored_dirs,
            include_exts: parse_ext_csv(include),
            exclude_exts: parse_ext_csv(exclude_exts),
        }
    }

    pub fn prunes_dir(&self, name: &str) -> bool {
        self.ignored_dirs.contains(name)
    }

    /// True if a file with this name survives the extension filters.
    pub fn keeps_file(&self, file_name: &str) -> bool {
        let extension = extension_of(file_name).unwrap_or("");
        if !self.include_exts.is_empty() && !self.include_exts.contains(extension) {
            return false;
        }
        !self.exclude_exts.contains(extension)
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks.
pub fn parse_csv(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Like [`parse_csv`], but normalizes every entry to carry a leading dot.
pub fn parse_ext_csv(raw: &str) -> BTreeSet<String> {
    parse_csv(raw)
        .into_iter()
        .map(|entry| {
            if entry.starts_with('.') {
                entry
            } else {
                format!(".{entry}")
            }
        })
        .collect()
}

/// Extension of the last path segment, including the dot.
///
/// Leading dots do not start an extension, so `.env` has none while
/// `archive.tar.gz` yields `.gz`.
pub fn extension_of(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem_start = name.find(|c: char| c != '.')?;
    let dot = name.rfind('.')?;
    (dot > stem_start).then(|| &name[dot..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_skips_leading_dots() {
        assert_eq!(extension_of("src/main.py"), Some(".py"));
        assert_eq!(extension_of("archive.tar.gz"), Some(".gz"));
        assert_eq!(extension_of(".env"), None);
        assert_eq!(extension_of("dir.d/Makefile"), None);
        assert_eq!(extension_of(".config.toml"), Some(".toml"));
    }

    #[test]
    fn ext_csv_normalizes_dots() {
        let exts = parse_ext_csv(" py, .rs ,,");
        assert_eq!(exts.into_iter().collect::<Vec<_>>(), vec![".py", ".rs"]);
    }

    #[test]
    fn deny_list_wins_over_allow_list() {
        let filters = ScanFilters::from_csv(CampaignKind::Audit, "", Some(".py,.js"), ".js");
        assert!(filters.keeps_file("a.py"));
        assert!(!filters.keeps_file("a.js"));
        assert!(!filters.keeps_file("a.go"));
    }

    #[test]
    fn read_campaign_defaults_to_source_allow_list() {
        let filters = ScanFilters::from_csv(CampaignKind::Read, "", None, "");
        assert!(filters.keeps_file("main.go"));
        assert!(!filters.keeps_file("README.md"));

        let unfiltered = ScanFilters::from_csv(CampaignKind::Read, "", Some(""), "");
        assert!(unfiltered.keeps_file("README.md"));
    }

    #[test]
    fn user_ignores_extend_defaults() {
        let filters = ScanFilters::from_csv(CampaignKind::Read, "vendor, target", None, "");
        assert!(filters.prunes_dir("vendor"));
        assert!(filters.prunes_dir("target"));
        assert!(filters.prunes_dir(".git"));
        assert!(filters.prunes_dir(".code-read"));
    }
}
