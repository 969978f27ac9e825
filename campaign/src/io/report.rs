//! Append-only vulnerability report for audit campaigns.

use std::fs::OpenOptions;
use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::types::Severity;
use crate::io::init::{CampaignPaths, create_dir};

const REPORT_HEADER: &str = "# Security Audit Report\n\n";
const DEFAULT_DESCRIPTION: &str = "No description provided.";

/// One reported vulnerability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub title: String,
    pub severity: Severity,
    /// File the finding refers to, as given by the reporter.
    pub file: String,
    pub description: Option<String>,
}

impl Finding {
    fn render(&self, timestamp: &str) -> String {
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|desc| !desc.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION);
        format!(
            "### [Vulnerability] {}\n\n- **Severity**: {}\n- **File**: `{}`\n- **Date**: {}\n- **Description**: {}\n\n---\n\n",
            self.title, self.severity, self.file, timestamp, description
        )
    }
}

/// Append `finding` to the report, creating it with a header on first write.
///
/// Task state is untouched; the report only shares the campaign data dir.
pub fn append_finding(paths: &CampaignPaths, finding: &Finding, timestamp: &str) -> Result<()> {
    create_dir(&paths.data_dir)?;
    let report_path = &paths.report_path;
    let is_new = !report_path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(report_path)
        .with_context(|| format!("open report {}", report_path.display()))?;
    if is_new {
        file.write_all(REPORT_HEADER.as_bytes())
            .with_context(|| format!("write report header {}", report_path.display()))?;
    }
    file.write_all(finding.render(timestamp).as_bytes())
        .with_context(|| format!("append report {}", report_path.display()))?;
    info!(title = %finding.title, severity = %finding.severity, "finding reported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kind::CampaignKind;
    use std::fs;

    fn finding(title: &str, description: Option<&str>) -> Finding {
        Finding {
            title: title.to_string(),
            severity: Severity::High,
            file: "src/login.py".to_string(),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn first_write_creates_header_then_appends() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = CampaignPaths::new(temp.path(), CampaignKind::Audit);

        append_finding(&paths, &finding("SQL injection", Some("raw query")), "t1").expect("first");
        append_finding(&paths, &finding("Weak hash", None), "t2").expect("second");

        let report = fs::read_to_string(&paths.report_path).expect("read");
        assert!(report.starts_with(REPORT_HEADER));
        assert_eq!(report.matches("# Security Audit Report").count(), 1);
        assert!(report.contains("### [Vulnerability] SQL injection"));
        assert!(report.contains("- **Severity**: High"));
        assert!(report.contains("- **File**: `src/login.py`"));
        assert!(report.contains("- **Date**: t1"));
        assert!(report.contains("- **Description**: raw query"));
        assert!(report.contains("- **Description**: No description provided."));
        let first = report.find("SQL injection").expect("first");
        let second = report.find("Weak hash").expect("second");
        assert!(first < second);
    }

    #[test]
    fn reporting_does_not_touch_registry() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = CampaignPaths::new(temp.path(), CampaignKind::Audit);
        append_finding(&paths, &finding("XSS", None), "t").expect("append");
        assert!(!paths.state_path.exists());
    }
}
