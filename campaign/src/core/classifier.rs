//! Deterministic classification of task paths into tags.

use std::collections::BTreeSet;

use crate::core::filters::extension_of;

/// What a rule matches against in the lower-cased path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Matches anywhere in the path.
    Substring(&'static str),
    /// Matches the file extension (including the leading dot).
    Extension(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub pattern: Pattern,
    pub tag: &'static str,
}

const fn kw(keyword: &'static str, tag: &'static str) -> Rule {
    Rule {
        pattern: Pattern::Substring(keyword),
        tag,
    }
}

const fn ext(extension: &'static str, tag: &'static str) -> Rule {
    Rule {
        pattern: Pattern::Extension(extension),
        tag,
    }
}

/// An ordered rule table. Every matching rule contributes its tag.
#[derive(Debug)]
pub struct RuleTable {
    pub rules: &'static [Rule],
}

pub static READ_RULES: RuleTable = RuleTable {
    rules: &[
        kw("main", "entrypoint"),
        kw("app", "entrypoint"),
        kw("index", "entrypoint"),
        kw("entry", "entrypoint"),
        kw("cmd", "entrypoint"),
        kw("manage", "entrypoint"),
        kw("util", "utils"),
        kw("common", "utils"),
        kw("helper", "utils"),
        kw("lib", "utils"),
        kw("config", "config"),
        kw("setting", "config"),
        kw("env", "config"),
        kw("model", "model"),
        kw("schema", "model"),
        kw("db", "model"),
        kw("entity", "model"),
    ],
};

pub static AUDIT_RULES: RuleTable = RuleTable {
    rules: &[
        kw("auth", "auth"),
        kw("login", "auth"),
        kw("register", "auth"),
        kw("password", "auth"),
        kw("secret", "auth"),
        kw("token", "auth"),
        kw("api", "routes"),
        kw("route", "routes"),
        kw("controller", "routes"),
        kw("view", "routes"),
        kw("endpoint", "routes"),
        kw("config", "config"),
        kw("settings", "config"),
        kw("env", "config"),
        kw("db", "database"),
        kw("database", "database"),
        kw("model", "database"),
        kw("sql", "database"),
        kw("schema", "database"),
        kw("upload", "upload"),
        kw("file", "upload"),
        kw("image", "upload"),
        kw("util", "utils"),
        kw("helper", "utils"),
        kw("common", "utils"),
        kw("docker", "container"),
        kw("k8s", "container"),
        kw("kube", "container"),
        kw("main", "entrypoint"),
        kw("app", "entrypoint"),
        kw("index", "entrypoint"),
        kw("server", "entrypoint"),
        ext(".ini", "config"),
        ext(".env", "config"),
        ext(".yaml", "config"),
        ext(".yml", "config"),
        ext(".json", "config"),
        ext(".xml", "config"),
        ext(".toml", "config"),
    ],
};

/// Classify `path` against `table`.
///
/// Pure: the result depends only on the path and the table, never on the
/// order in which paths are discovered.
pub fn classify(path: &str, table: &RuleTable) -> BTreeSet<String> {
    let lower = path.to_lowercase();
    let extension = extension_of(&lower);
    table
        .rules
        .iter()
        .filter(|rule| match rule.pattern {
            Pattern::Substring(needle) => lower.contains(needle),
            Pattern::Extension(wanted) => extension == Some(wanted),
        })
        .map(|rule| rule.tag.to_string())
        .collect()
}
