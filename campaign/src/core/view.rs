//! Human-readable projection of a registry.
//!
//! The view is a pure function of the registry: it is always regenerated in
//! full and never parsed back. Timestamps come from the registry itself, so
//! identical registries render byte-identical documents.

use crate::core::kind::CampaignKind;
use crate::core::registry::Registry;
use crate::core::selector::ordered_pending;
use crate::core::types::Task;

/// Completed entries shown in a reading view before collapsing into a tail.
pub const COMPLETED_TAIL: usize = 20;

/// Render the full progress document for `registry`.
pub fn render_view(registry: &Registry, kind: CampaignKind) -> String {
    let lines = match kind {
        CampaignKind::Read => render_read(registry),
        CampaignKind::Audit => render_audit(registry),
    };
    let mut doc = lines.join("\n");
    doc.push('\n');
    doc
}

/// Checklist line for a pending task, as shown in the view and in excerpts.
pub fn pending_line(task: &Task, kind: CampaignKind) -> String {
    match kind {
        CampaignKind::Read => {
            if task.tags.is_empty() {
                format!("- [ ] `{}`", task.path)
            } else {
                format!("- [ ] `{}` `[{}]`", task.path, task.tag_list())
            }
        }
        CampaignKind::Audit => audit_entry(task),
    }
}

/// Audit entry without a checkbox: `` `path`  (tags)  - reason ``.
pub fn audit_entry(task: &Task) -> String {
    format!(
        "- `{}`  ({})  - {}",
        task.path,
        task.tag_list(),
        task.reason.as_deref().unwrap_or("")
    )
}

fn progress_line(registry: &Registry) -> String {
    let progress = registry.progress();
    format!(
        "## Progress: {}/{} ({:.1}%)",
        progress.completed,
        progress.total,
        progress.percent()
    )
}

fn render_read(registry: &Registry) -> Vec<String> {
    let mut lines = vec![
        "# Code Reading Progress (CODE_READ_TODO)".to_string(),
        format!("> Generated: {}", registry.timestamp()),
        format!("> Root: `{}`", registry.root),
        String::new(),
        progress_line(registry),
        String::new(),
        "## Pending".to_string(),
    ];

    let pending = ordered_pending(registry, CampaignKind::Read);
    if pending.is_empty() {
        lines.push("- (none, every file has been processed)".to_string());
    } else {
        lines.extend(
            pending
                .iter()
                .map(|task| pending_line(task, CampaignKind::Read)),
        );
    }

    lines.push(String::new());
    lines.push("## Completed".to_string());
    let completed: Vec<&Task> = registry.completed().collect();
    if completed.is_empty() {
        lines.push("- (none yet)".to_string());
    }
    let skip = completed.len().saturating_sub(COMPLETED_TAIL);
    lines.extend(
        completed[skip..]
            .iter()
            .map(|task| format!("- [x] `{}`", task.path)),
    );
    if skip > 0 {
        lines.push(format!("- ...(+{skip} more)"));
    }

    push_ignored_dirs(&mut lines, registry);
    lines.push(String::new());
    lines.push("## Notes".to_string());
    lines.push("- This file is regenerated from the state file on every change; do not edit it by hand.".to_string());
    lines.push("- Mark files as read with `campaign --kind read done <path>...`.".to_string());
    lines
}

fn render_audit(registry: &Registry) -> Vec<String> {
    let mut lines = vec![
        "# Security Audit File Tree TODO".to_string(),
        String::new(),
        format!("Generated: `{}`", registry.timestamp()),
        format!("Root: `{}`", registry.root),
        format!("Goal: `{}`", registry.goal.as_deref().unwrap_or("")),
        String::new(),
        progress_line(registry),
        String::new(),
        "## Detected Stacks".to_string(),
    ];
    if let Some(stacks) = &registry.stacks {
        lines.extend(stacks.iter().map(|stack| format!("- {stack}")));
    }

    lines.push(String::new());
    lines.push("## TODO".to_string());
    if registry.targets.is_empty() {
        lines.push("- (no targets)".to_string());
    }
    for task in &registry.targets {
        let mark = if task.is_pending() { "[ ]" } else { "[x]" };
        lines.push(format!(
            "- {} `{}`  ({})  - {}",
            mark,
            task.path,
            task.tag_list(),
            task.reason.as_deref().unwrap_or("")
        ));
    }

    push_ignored_dirs(&mut lines, registry);
    lines.push(String::new());
    lines.push("## Notes".to_string());
    lines.push(
        "- A checked box means the file (and its related call chain) has been audited."
            .to_string(),
    );
    lines.push("- Report findings with `campaign --kind audit report ...`.".to_string());
    lines
}

fn push_ignored_dirs(lines: &mut Vec<String>, registry: &Registry) {
    lines.push(String::new());
    lines.push("## Ignored Directories".to_string());
    if let Some(dirs) = &registry.ignored_dirs {
        lines.extend(dirs.iter().map(|dir| format!("- `{dir}/`")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TaskStatus;
    use crate::test_support::{registry_with, tagged_task, task};

    #[test]
    fn read_view_lists_entrypoints_first_with_progress() {
        let registry = registry_with(vec![
            tagged_task("lib/util.py", TaskStatus::Pending, &["utils"]),
            tagged_task("app/main.py", TaskStatus::Pending, &["entrypoint"]),
            task("done.py", TaskStatus::Completed),
        ]);
        let view = render_view(&registry, CampaignKind::Read);

        assert!(view.contains("## Progress: 1/3 (33.3%)"));
        let main = view.find("- [ ] `app/main.py` `[entrypoint]`").expect("main");
        let util = view.find("- [ ] `lib/util.py` `[utils]`").expect("util");
        assert!(main < util);
        assert!(view.contains("- [x] `done.py`"));
        assert!(view.ends_with('\n'));
    }

    #[test]
    fn read_view_truncates_completed_section() {
        let tasks = (0..25)
            .map(|idx| task(&format!("f{idx:02}.py"), TaskStatus::Completed))
            .collect();
        let registry = registry_with(tasks);
        let view = render_view(&registry, CampaignKind::Read);

        assert!(!view.contains("`f04.py`"));
        assert!(view.contains("- [x] `f05.py`"));
        assert!(view.contains("- [x] `f24.py`"));
        assert!(view.contains("- ...(+5 more)"));
        assert!(view.contains("- (none, every file has been processed)"));
        assert!(view.contains("(100.0%)"));
    }

    #[test]
    fn audit_view_lists_every_task_with_checkbox() {
        let mut registry = registry_with(
            (0..30)
                .map(|idx| task(&format!("f{idx:02}.py"), TaskStatus::Completed))
                .collect(),
        );
        registry.goal = Some("find injections".to_string());
        registry.targets[0].reason = Some("Initial scan".to_string());
        registry.targets[1].status = TaskStatus::Pending;

        let view = render_view(&registry, CampaignKind::Audit);
        assert!(view.contains("Goal: `find injections`"));
        assert!(view.contains("- [x] `f00.py`  ()  - Initial scan"));
        assert!(view.contains("- [ ] `f01.py`"));
        assert!(view.contains("- [x] `f29.py`"));
        assert!(!view.contains("more)"));
    }

    #[test]
    fn empty_registry_renders_zero_progress() {
        let registry = registry_with(Vec::new());
        let view = render_view(&registry, CampaignKind::Audit);
        assert!(view.contains("## Progress: 0/0 (0.0%)"));
        assert!(view.contains("- (no targets)"));
    }

    #[test]
    fn view_ignores_input_field_order() {
        let a = r#"{"root":"/repo","created_at":"t","targets":[{"path":"x.py","status":"pending","tags":["utils","config"]}]}"#;
        let b = r#"{"targets":[{"tags":["config","utils"],"status":"pending","path":"x.py"}],"created_at":"t","root":"/repo"}"#;
        let a: Registry = serde_json::from_str(a).expect("parse a");
        let b: Registry = serde_json::from_str(b).expect("parse b");
        for kind in [CampaignKind::Read, CampaignKind::Audit] {
            assert_eq!(render_view(&a, kind), render_view(&b, kind));
        }
    }
}
