//! Read-only filesystem traversal for `init` and `scan`.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use anyhow::{Result, anyhow};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::core::filters::{ScanFilters, extension_of};

/// List every file under `root` that survives `filters`.
///
/// Paths are relative to `root`, `/`-separated, in sorted traversal order.
/// Pruned directory names are skipped at any depth. Unreadable entries are
/// logged and skipped.
pub fn scan_files(root: &Path, filters: &ScanFilters) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(anyhow!("scan root {} is not a directory", root.display()));
    }
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry, filters));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(err = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !is_file_entry(&entry) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !filters.keeps_file(&name) {
            continue;
        }
        let Some(rel) = relative_posix(root, entry.path()) else {
            continue;
        };
        if seen.insert(rel.clone()) {
            files.push(rel);
        } else {
            warn!(path = %rel, "skipping file whose normalized path is already listed");
        }
    }
    debug!(root = %root.display(), count = files.len(), "scan finished");
    Ok(files)
}

/// Per-directory statistics for the `scan` summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirSummary {
    /// Relative path of the directory (`.` for the root).
    pub path: String,
    pub depth: usize,
    /// Files directly inside the directory.
    pub file_count: usize,
    /// Up to three most common extensions, by count then name.
    pub top_exts: Vec<(String, usize)>,
}

/// Summarize directories up to `max_depth` below `root`.
pub fn summarize_dirs(
    root: &Path,
    ignored_dirs: &BTreeSet<String>,
    max_depth: usize,
) -> Result<Vec<DirSummary>> {
    if !root.is_dir() {
        return Err(anyhow!("scan root {} is not a directory", root.display()));
    }
    let mut dirs: BTreeMap<String, (usize, BTreeMap<String, usize>)> = BTreeMap::new();
    let walker = WalkDir::new(root)
        .max_depth(max_depth + 1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && ignored_dirs.contains(&*entry.file_name().to_string_lossy()))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(err = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            if entry.depth() <= max_depth
                && let Some(rel) = summary_key(root, entry.path(), entry.depth())
            {
                dirs.entry(rel).or_default();
            }
            continue;
        }
        if !is_file_entry(&entry) {
            continue;
        }
        let Some(parent) = entry.path().parent() else {
            continue;
        };
        let Some(parent_rel) = summary_key(root, parent, entry.depth() - 1) else {
            continue;
        };
        let name = entry.file_name().to_string_lossy();
        let ext = extension_of(&name).unwrap_or("").to_string();
        let stats = dirs.entry(parent_rel).or_default();
        stats.0 += 1;
        *stats.1.entry(ext).or_default() += 1;
    }

    Ok(dirs
        .into_iter()
        .map(|(path, (file_count, exts))| {
            let mut top_exts: Vec<(String, usize)> = exts.into_iter().collect();
            top_exts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            top_exts.truncate(3);
            let depth = if path == "." {
                0
            } else {
                path.split('/').count()
            };
            DirSummary {
                path,
                depth,
                file_count,
                top_exts,
            }
        })
        .collect())
}

fn is_pruned(entry: &DirEntry, filters: &ScanFilters) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && filters.prunes_dir(&entry.file_name().to_string_lossy())
}

/// Regular files and symlinks resolving to regular files.
///
/// The walk itself never follows links, so symlinked directories are not
/// descended into.
fn is_file_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

/// Summary key of a directory at `depth`: `.` for the root.
fn summary_key(root: &Path, dir: &Path, depth: usize) -> Option<String> {
    if depth == 0 {
        return Some(".".to_string());
    }
    relative_posix(root, dir)
}

/// `path` relative to `root` with every `\` turned into `/`.
///
/// `None` for the root itself and for names that are not valid UTF-8, which
/// cannot be stored losslessly.
fn relative_posix(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let Some(rel) = rel.to_str() else {
        warn!(path = %path.display(), "skipping non-UTF-8 path");
        return None;
    };
    if rel.is_empty() {
        return None;
    }
    Some(rel.replace('\\', "/"))
}
