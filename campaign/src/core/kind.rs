//! Named configurations for the two campaign kinds.
//!
//! A reading campaign walks a codebase to produce documentation; an audit
//! campaign walks it looking for vulnerabilities. Both share the registry
//! model and differ only in the constants below.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};

use crate::core::classifier::{AUDIT_RULES, READ_RULES, RuleTable};

/// Which campaign a data directory belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CampaignKind {
    Read,
    Audit,
}

impl CampaignKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignKind::Read => "read",
            CampaignKind::Audit => "audit",
        }
    }

    /// Directory (under the campaign root) holding all campaign artifacts.
    pub fn data_dir(self) -> &'static str {
        match self {
            CampaignKind::Read => ".code-read",
            CampaignKind::Audit => ".security-audit",
        }
    }

    pub fn state_file(self) -> &'static str {
        match self {
            CampaignKind::Read => ".state.json",
            CampaignKind::Audit => "SECURITY_FILETREE_TODO.json",
        }
    }

    pub fn view_file(self) -> &'static str {
        match self {
            CampaignKind::Read => "CODE_READ_TODO.md",
            CampaignKind::Audit => "SECURITY_FILETREE_TODO.md",
        }
    }

    pub fn rules(self) -> &'static RuleTable {
        match self {
            CampaignKind::Read => &READ_RULES,
            CampaignKind::Audit => &AUDIT_RULES,
        }
    }

    /// Upper bound on excerpt entries handed to the worker by `next`.
    pub fn display_cap(self) -> usize {
        match self {
            CampaignKind::Read => 60,
            CampaignKind::Audit => 120,
        }
    }

    /// Directory names pruned from every scan, before user additions.
    pub fn default_ignored_dirs(self) -> &'static [&'static str] {
        match self {
            CampaignKind::Read => &[
                ".git",
                ".idea",
                ".vscode",
                "__pycache__",
                "node_modules",
                "dist",
                "build",
                "venv",
                ".venv",
                ".code-read",
            ],
            CampaignKind::Audit => &[
                ".git",
                ".idea",
                ".vscode",
                "__pycache__",
                "node_modules",
                "dist",
                "build",
                "venv",
                ".venv",
                ".trae",
                ".security-audit",
            ],
        }
    }

    /// Allow-list applied when `init` is called without `--include-exts`.
    pub fn default_include_exts(self) -> &'static str {
        match self {
            CampaignKind::Read => ".py,.js,.ts,.go,.java,.c,.cpp,.h",
            CampaignKind::Audit => "",
        }
    }

    pub fn default_goal(self) -> Option<&'static str> {
        match self {
            CampaignKind::Read => None,
            CampaignKind::Audit => Some("Comprehensive security audit"),
        }
    }
}

impl fmt::Display for CampaignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "read" => Ok(CampaignKind::Read),
            "audit" => Ok(CampaignKind::Audit),
            other => Err(anyhow!(
                "unknown campaign kind '{other}' (expected read or audit)"
            )),
        }
    }
}
