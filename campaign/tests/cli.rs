//! CLI tests for the `campaign` binary.
//!
//! Spawns the binary against temporary trees and checks stdout and exit codes.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use campaign::exit_codes;
use campaign::test_support::TestTree;

fn campaign(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_campaign"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn campaign")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn read_campaign_runs_to_completion() {
    let tree = TestTree::new(&["app/main.py", "lib/util.py", "README.md"]).expect("tree");

    let init = campaign(tree.path(), &["init"]);
    assert_eq!(init.status.code(), Some(exit_codes::OK));
    assert!(stdout(&init).contains("2 files discovered"));
    assert!(tree.path().join(".code-read/.state.json").is_file());
    assert!(tree.path().join(".code-read/CODE_READ_TODO.md").is_file());

    let next = campaign(tree.path(), &["next"]);
    assert_eq!(next.status.code(), Some(exit_codes::OK));
    let excerpt = stdout(&next);
    let main = excerpt.find("`app/main.py`").expect("main listed");
    let util = excerpt.find("`lib/util.py`").expect("util listed");
    assert!(main < util);
    assert!(!excerpt.contains("README.md"));

    let status = campaign(tree.path(), &["status"]);
    assert_eq!(status.status.code(), Some(exit_codes::OK));
    assert!(stdout(&status).contains("2 tasks pending"));

    let done = campaign(tree.path(), &["done", "app/main.py", "lib\\util.py", "nope.py"]);
    assert_eq!(done.status.code(), Some(exit_codes::OK));
    let done_out = stdout(&done);
    assert!(done_out.contains("Completed: app/main.py"));
    assert!(done_out.contains("Completed: lib/util.py"));
    assert!(done_out.contains("Warning: nope.py is not in the task list"));

    let next = campaign(tree.path(), &["next"]);
    assert_eq!(stdout(&next).trim(), "All tasks completed!");

    let status = campaign(tree.path(), &["status"]);
    assert_eq!(status.status.code(), Some(exit_codes::COMPLETE));
}

#[test]
fn commands_before_init_fail() {
    let tree = TestTree::new(&["a.py"]).expect("tree");
    let cases: [&[&str]; 4] = [&["next"], &["status"], &["done", "a.py"], &["remove", "a"]];
    for args in cases {
        let output = campaign(tree.path(), args);
        assert_eq!(output.status.code(), Some(exit_codes::INVALID), "{args:?}");
        assert!(String::from_utf8_lossy(&output.stderr).contains("init"));
    }
}

#[test]
fn audit_next_includes_prompt_and_report_appends() {
    let tree = TestTree::new(&["src/auth/login.py", "config.yaml"]).expect("tree");

    let init = campaign(tree.path(), &["--kind", "audit", "init"]);
    assert_eq!(init.status.code(), Some(exit_codes::OK));
    assert!(
        tree.path()
            .join(".security-audit/SECURITY_FILETREE_TODO.json")
            .is_file()
    );

    let next = campaign(tree.path(), &["--kind", "audit", "next"]);
    let text = stdout(&next);
    assert!(text.contains("Goal: Comprehensive security audit"));
    assert!(text.contains("Pending targets this round: 2"));
    assert!(text.contains("`src/auth/login.py`"));

    for title in ["SQL injection", "Hardcoded secret"] {
        let report = campaign(
            tree.path(),
            &[
                "--kind",
                "audit",
                "report",
                "--title",
                title,
                "--severity",
                "High",
                "--file",
                "src/auth/login.py",
            ],
        );
        assert_eq!(report.status.code(), Some(exit_codes::OK));
    }
    let report = fs::read_to_string(tree.path().join(".security-audit/SECURITY_AUDIT_REPORT.md"))
        .expect("report");
    assert_eq!(report.matches("# Security Audit Report").count(), 1);
    assert!(report.contains("### [Vulnerability] SQL injection"));
    assert!(report.contains("### [Vulnerability] Hardcoded secret"));
}

#[test]
fn report_is_rejected_for_read_campaigns() {
    let tree = TestTree::new(&["a.py"]).expect("tree");
    let output = campaign(
        tree.path(),
        &["report", "--title", "x", "--severity", "Low", "--file", "a.py"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(!tree.path().join(".security-audit").exists());
}

#[test]
fn scan_summarizes_directories() {
    let tree = TestTree::new(&["src/a.rs", "src/b.rs", "node_modules/x.js"]).expect("tree");
    let output = campaign(tree.path(), &["scan", "--max-depth", "1"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let text = stdout(&output);
    assert!(text.contains("src/ (2 files; .rs: 2)"));
    assert!(!text.contains("node_modules"));
}

#[test]
fn usage_errors_do_not_look_like_completion() {
    let tree = TestTree::new(&["a.py"]).expect("tree");

    let bad_kind = campaign(tree.path(), &["status", "--kind", "lint"]);
    assert_eq!(bad_kind.status.code(), Some(exit_codes::INVALID));
    assert!(!bad_kind.stderr.is_empty());

    let unknown = campaign(tree.path(), &["frobnicate"]);
    assert_eq!(unknown.status.code(), Some(exit_codes::INVALID));

    let help = campaign(tree.path(), &["--help"]);
    assert_eq!(help.status.code(), Some(exit_codes::OK));
    assert!(stdout(&help).contains("Usage"));
}
