//! Source-relative path rewriting.
//!
//! Before a document is merged, string leaves at context paths matching the
//! policy's resolve-path patterns are joined with the document's own source
//! directory, so file references stay valid once the document is pulled into
//! a combined tree rooted elsewhere. The pass mutates the document in place
//! and runs exactly once per document.

use crate::policy::MergePolicy;
use serde_json::{Map, Value};
use tracing::debug;

/// Rewrite matching string leaves of `object` in place, joining them with
/// `source_dir`.
pub fn resolve_paths(
    policy: &MergePolicy,
    object: &mut Map<String, Value>,
    source_dir: &str,
    context_path: &str,
) {
    for (key, value) in object.iter_mut() {
        let path = format!("{context_path}.{key}");
        if let Some(updated) = resolve_value(policy, value, source_dir, &path) {
            *value = updated;
        }
    }
}

/// Rewrite a single value. Returns a replacement for strings at matching
/// paths and for sequences whose elements all rewrote; mappings recurse and
/// mutate in place, never counting as rewritten themselves.
fn resolve_value(
    policy: &MergePolicy,
    value: &mut Value,
    source_dir: &str,
    context_path: &str,
) -> Option<Value> {
    match value {
        // Sequence elements share their key's context path. All-or-nothing:
        // if any element fails to rewrite, the whole sequence is left
        // untouched and handled as an ordinary merge.
        Value::Array(elements) => {
            let mut updated = Vec::with_capacity(elements.len());
            for element in elements.iter_mut() {
                if let Some(v) = resolve_value(policy, element, source_dir, context_path) {
                    updated.push(v);
                }
            }
            (updated.len() == elements.len()).then_some(Value::Array(updated))
        }
        Value::Object(object) => {
            resolve_paths(policy, object, source_dir, context_path);
            None
        }
        Value::String(s) if policy.resolve_path(context_path) => {
            let joined = join_source_dir(source_dir, s);
            debug!(path = %context_path, old = %s, new = %joined, "resolved relative path");
            Some(Value::String(joined))
        }
        // Non-string scalars are not path-like.
        _ => None,
    }
}

/// Join a source directory and a relative reference, dropping `.` components
/// and collapsing `..` against named components. Pure string manipulation,
/// forward slashes, no filesystem I/O.
fn join_source_dir(source_dir: &str, value: &str) -> String {
    let source_dir = source_dir.replace('\\', "/");
    let value = value.replace('\\', "/");
    let joined = format!("{}/{}", source_dir.trim_end_matches('/'), value);
    let absolute = joined.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for part in joined.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(p) if *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if absolute { format!("/{body}") } else { body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve_policy(patterns: &[&str]) -> MergePolicy {
        MergePolicy::new(
            false,
            &[],
            &[],
            &patterns.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        )
        .unwrap()
    }

    fn resolve(policy: &MergePolicy, doc: Value, source_dir: &str) -> Value {
        let Value::Object(mut object) = doc else {
            panic!("test document must be a mapping");
        };
        resolve_paths(policy, &mut object, source_dir, "$");
        Value::Object(object)
    }

    #[test]
    fn test_string_leaf_rewritten_against_source_dir() {
        let policy = resolve_policy(&[".local"]);
        let doc = json!({"storage": {"files": {"local": "foo.ign"}}});
        assert_eq!(
            resolve(&policy, doc.clone(), "host-dir"),
            json!({"storage": {"files": {"local": "host-dir/foo.ign"}}})
        );
        assert_eq!(
            resolve(&policy, doc, "common"),
            json!({"storage": {"files": {"local": "common/foo.ign"}}})
        );
    }

    #[test]
    fn test_non_matching_paths_untouched() {
        let policy = resolve_policy(&[".local"]);
        let doc = json!({"storage": {"files": {"path": "/etc/foo.conf"}}});
        assert_eq!(resolve(&policy, doc.clone(), "host-dir"), doc);
    }

    #[test]
    fn test_non_string_scalar_untouched() {
        let policy = resolve_policy(&[".local"]);
        let doc = json!({"local": 42});
        assert_eq!(resolve(&policy, doc.clone(), "host-dir"), doc);
    }

    #[test]
    fn test_sequence_of_strings_all_rewritten() {
        let policy = resolve_policy(&[".local"]);
        let doc = json!({"local": ["a.ign", "b.ign"]});
        assert_eq!(
            resolve(&policy, doc, "host-dir"),
            json!({"local": ["host-dir/a.ign", "host-dir/b.ign"]})
        );
    }

    #[test]
    fn test_empty_sequence_survives_at_matching_path() {
        // Trivially "all elements rewritten": stays an empty sequence,
        // never degrades to null.
        let policy = resolve_policy(&[".local"]);
        let doc = json!({"local": []});
        assert_eq!(resolve(&policy, doc.clone(), "host-dir"), doc);
    }

    #[test]
    fn test_partially_rewritable_sequence_left_untouched() {
        // All-or-nothing: the number can never rewrite, so even the string
        // elements stay as authored. Pinned deliberately; if this ever
        // changes it should become an error, not a silent partial rewrite.
        let policy = resolve_policy(&[".local"]);
        let doc = json!({"local": ["a.ign", 42, "b.ign"]});
        assert_eq!(resolve(&policy, doc.clone(), "host-dir"), doc);
    }

    #[test]
    fn test_mappings_inside_sequences_rewritten_in_place() {
        // Sequence elements share the key's context path, so `.local`
        // matches inside each element. The sequence itself is not replaced,
        // but its mapping elements are mutated in place.
        let policy = resolve_policy(&[".local"]);
        let doc = json!({"storage": {"files": [
            {"path": "/etc/a.conf", "local": "a.conf"},
            {"path": "/etc/b.conf", "local": "b.conf"},
        ]}});
        assert_eq!(
            resolve(&policy, doc, "common"),
            json!({"storage": {"files": [
                {"path": "/etc/a.conf", "local": "common/a.conf"},
                {"path": "/etc/b.conf", "local": "common/b.conf"},
            ]}})
        );
    }

    #[test]
    fn test_join_cleans_dot_components() {
        assert_eq!(join_source_dir(".", "foo.ign"), "foo.ign");
        assert_eq!(join_source_dir("a/b", "./c"), "a/b/c");
    }

    #[test]
    fn test_join_collapses_parent_components() {
        assert_eq!(join_source_dir("a/b", "../c"), "a/c");
        assert_eq!(join_source_dir("a", "../../c"), "../c");
        assert_eq!(join_source_dir("/a/b", "../c"), "/a/c");
    }
}
