//! Merge options: the caller-facing configuration surface.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configures merge behavior for a set of documents.
///
/// The pattern fields hold context-path patterns such as `$.storage.files`
/// (absolute, exact match) or `.local` (relative, suffix match). A pattern
/// with neither prefix is treated as absolute at the document root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Base directory document source identifiers are resolved against.
    pub base_dir: PathBuf,

    /// Conflict policy when no pattern matches a context path: `false`
    /// errors on scalar conflicts and concatenates sequences, `true` lets
    /// later documents win.
    pub default_overwrite: bool,

    /// Patterns forcing overwrite-on-conflict.
    pub overwrite: Vec<String>,

    /// Patterns forcing append/concatenate-on-conflict.
    pub append: Vec<String>,

    /// Patterns whose string leaves are rewritten relative to each source
    /// document's directory before merging.
    pub resolve_path: Vec<String>,
}

impl MergeOptions {
    /// Load options from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading options file {}", path.display()))?;
        let options = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing options file {}", path.display()))?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let options = MergeOptions::default();
        assert!(!options.default_overwrite);
        assert!(options.overwrite.is_empty());
        assert!(options.append.is_empty());
        assert!(options.resolve_path.is_empty());
    }

    #[test]
    fn test_from_file_with_partial_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("merge.yaml");
        std::fs::write(
            &path,
            r#"
default_overwrite: true
resolve_path:
  - .local
"#,
        )
        .unwrap();

        let options = MergeOptions::from_file(&path).unwrap();
        assert!(options.default_overwrite);
        assert_eq!(options.resolve_path, vec![".local".to_string()]);
        assert!(options.overwrite.is_empty());
    }
}
