//! Path-pattern policy matching for merge behavior.
//!
//! Patterns address context paths such as `$.storage.files`. A pattern is
//! either absolute (`$.` prefix, matched by exact equality) or relative
//! (`.` prefix, matched by suffix); a pattern with neither prefix is
//! normalized to absolute at the document root. Precedence is absolute,
//! then relative, then the configured default.

use crate::error::{MergeError, MergeResult};
use crate::options::MergeOptions;

/// A single compiled policy rule.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PolicyEntry {
    pattern: String,
    policy: bool,
    is_relative: bool,
}

impl PolicyEntry {
    fn matches(&self, context_path: &str) -> bool {
        if self.is_relative {
            context_path.ends_with(&self.pattern)
        } else {
            self.pattern == context_path
        }
    }
}

/// An ordered set of compiled rules. First match in order wins.
#[derive(Debug, Clone, Default)]
struct PolicySet {
    entries: Vec<PolicyEntry>,
}

impl PolicySet {
    /// Add a rule, normalizing bare patterns to absolute.
    ///
    /// Rejects a normalized pattern already present with the opposite policy.
    fn add(&mut self, pattern: &str, policy: bool) -> MergeResult<()> {
        let pattern = normalize_pattern(pattern);
        if self
            .entries
            .iter()
            .any(|e| e.pattern == pattern && e.policy != policy)
        {
            return Err(MergeError::ConflictingPolicy { pattern });
        }
        let is_relative = pattern.starts_with('.');
        self.entries.push(PolicyEntry {
            pattern,
            policy,
            is_relative,
        });
        Ok(())
    }

    /// Fix the match order: absolute entries before relative entries, each
    /// group ordered by pattern. Never re-sorted after construction.
    fn sort(&mut self) {
        self.entries.sort_by(|a, b| {
            a.is_relative
                .cmp(&b.is_relative)
                .then_with(|| a.pattern.cmp(&b.pattern))
        });
    }

    fn first_match(&self, context_path: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|e| e.matches(context_path))
            .map(|e| e.policy)
    }
}

/// Normalize a pattern: anything without a `.` or `$.` prefix is a bare key
/// name and becomes absolute at the document root.
fn normalize_pattern(pattern: &str) -> String {
    if pattern.starts_with('.') || pattern.starts_with("$.") {
        pattern.to_string()
    } else {
        format!("$.{pattern}")
    }
}

/// Compiled merge policy, built once per merge operation and shared
/// read-only by the path resolver and the document merger.
#[derive(Debug, Clone)]
pub struct MergePolicy {
    overwrite: PolicySet,
    default_overwrite: bool,
    resolve_paths: PolicySet,
}

impl MergePolicy {
    /// Compile overwrite, append and resolve-path patterns into fixed-order
    /// policy sets.
    ///
    /// Returns [`MergeError::ConflictingPolicy`] if the same normalized
    /// pattern appears in both `overwrite` and `append`.
    pub fn new(
        default_overwrite: bool,
        overwrite: &[String],
        append: &[String],
        resolve_path: &[String],
    ) -> MergeResult<Self> {
        let mut conflict = PolicySet::default();
        for pattern in overwrite {
            conflict.add(pattern, true)?;
        }
        for pattern in append {
            conflict.add(pattern, false)?;
        }
        conflict.sort();

        let mut resolve = PolicySet::default();
        for pattern in resolve_path {
            resolve.add(pattern, true)?;
        }
        resolve.sort();

        Ok(Self {
            overwrite: conflict,
            default_overwrite,
            resolve_paths: resolve,
        })
    }

    /// Compile the policy from merge options.
    pub fn from_options(options: &MergeOptions) -> MergeResult<Self> {
        Self::new(
            options.default_overwrite,
            &options.overwrite,
            &options.append,
            &options.resolve_path,
        )
    }

    /// Whether conflicts at `context_path` resolve by overwrite (`true`) or
    /// append/error (`false`). Falls back to the configured default when no
    /// pattern matches.
    pub fn is_overwrite(&self, context_path: &str) -> bool {
        self.overwrite
            .first_match(context_path)
            .unwrap_or(self.default_overwrite)
    }

    /// Whether string leaves at `context_path` are rewritten relative to
    /// their document's source directory.
    pub fn resolve_path(&self, context_path: &str) -> bool {
        self.resolve_paths.first_match(context_path).unwrap_or(false)
    }
}
