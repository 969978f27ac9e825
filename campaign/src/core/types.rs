//! Shared deterministic types for the campaign registry.
//!
//! These types define the persisted contract of a campaign store. They must
//! not depend on external state or I/O and must serialize identically across
//! runs.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Reason stamped on audit tasks created by a scan.
pub const INITIAL_REASON: &str = "Initial scan";

/// Lifecycle state of a single task. Transitions are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

/// One file's traversal record.
///
/// Fields are declared in lexicographic order so the serialized store has
/// sorted keys without a post-processing pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// POSIX-style path relative to the campaign root. Unique within a registry.
    pub path: String,
    /// Free-text annotation (audit campaigns only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: TaskStatus,
    /// Classification labels, computed once from `path` at creation.
    pub tags: BTreeSet<String>,
}

impl Task {
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Comma-joined tag list in stable order.
    pub fn tag_list(&self) -> String {
        self.tags.iter().map(String::as_str).collect::<Vec<_>>().join(",")
    }
}

/// Severity of a reported vulnerability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "High" => Ok(Severity::High),
            "Medium" => Ok(Severity::Medium),
            "Low" => Ok(Severity::Low),
            other => Err(anyhow!(
                "invalid severity '{other}' (expected High, Medium or Low)"
            )),
        }
    }
}
