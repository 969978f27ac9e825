//! Semantic invariants not expressible via JSON Schema.

use std::collections::HashSet;

use crate::core::registry::Registry;

/// Check registry invariants not expressible in JSON Schema:
/// - No duplicate task paths
/// - Paths are relative and use `/` separators
pub fn validate_invariants(registry: &Registry) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for (idx, task) in registry.targets.iter().enumerate() {
        if !seen.insert(task.path.as_str()) {
            errors.push(format!("duplicate path '{}' at targets[{}]", task.path, idx));
        }
        if task.path.starts_with('/') {
            errors.push(format!("targets[{}]: path '{}' must be relative", idx, task.path));
        }
        if task.path.contains('\\') {
            errors.push(format!(
                "targets[{}]: path '{}' must use '/' separators",
                idx, task.path
            ));
        }
    }
    errors
}
