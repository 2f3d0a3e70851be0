//! Structured error types for merge operations.

use thiserror::Error;

/// Structural kind of a document tree value, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Mapping,
    Sequence,
    Scalar,
}

impl ValueKind {
    /// Classify a tree value by its structural shape.
    pub fn of(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(_) => ValueKind::Mapping,
            serde_json::Value::Array(_) => ValueKind::Sequence,
            _ => ValueKind::Scalar,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Mapping => write!(f, "mapping"),
            ValueKind::Sequence => write!(f, "sequence"),
            ValueKind::Scalar => write!(f, "scalar"),
        }
    }
}

/// Errors produced while building a merge policy or merging documents.
///
/// Every variant aborts the whole merge. The caller sees the first problem
/// encountered in document-then-depth-first-key order, and must discard any
/// partially merged tree.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The same normalized pattern was declared both overwrite and append.
    /// Detected at policy construction, before any document is read.
    #[error("conflicting policy: pattern `{pattern}` declared both overwrite and append")]
    ConflictingPolicy { pattern: String },

    /// A document could not be read.
    #[error("document `{source_id}`: {error}")]
    Load {
        source_id: String,
        #[source]
        error: std::io::Error,
    },

    /// A document could not be parsed as YAML.
    #[error("document `{source_id}`: invalid YAML: {error}")]
    Parse {
        source_id: String,
        #[source]
        error: serde_yaml::Error,
    },

    /// A document's top level is not a mapping.
    #[error("document `{source_id}`: top level must be a mapping, got {kind}")]
    NotAMapping { source_id: String, kind: ValueKind },

    /// A key holds different structural types in two documents.
    #[error("key `{path}` mismatch: src is {src} but dst is {dst}")]
    TypeMismatch {
        path: String,
        src: ValueKind,
        dst: ValueKind,
    },

    /// A scalar key repeats with a different value under a non-overwrite policy.
    #[error("duplicate key `{path}` (overwrite=false)")]
    DuplicateKey { path: String },

    /// A merge conflict wrapped with the document that introduced it.
    #[error("document `{source_id}`: {error}")]
    InDocument {
        source_id: String,
        #[source]
        error: Box<MergeError>,
    },
}

impl MergeError {
    /// Attach the failing document's source id to a merge-conflict error.
    ///
    /// Errors that already name their document (load, parse, non-mapping
    /// top level) are returned unchanged.
    pub fn for_document(self, source_id: &str) -> Self {
        match self {
            MergeError::TypeMismatch { .. } | MergeError::DuplicateKey { .. } => {
                MergeError::InDocument {
                    source_id: source_id.to_string(),
                    error: Box::new(self),
                }
            }
            other => other,
        }
    }
}

/// Result type for merge operations.
pub type MergeResult<T> = std::result::Result<T, MergeError>;
