//! Document loading.
//!
//! The merge core consumes documents through [`DocumentLoader`]: a source
//! identifier resolves to raw bytes plus the directory component that
//! relative paths inside the document are resolved against. The concrete
//! text format never leaks past the loader boundary.

use crate::error::{MergeError, MergeResult};
use std::path::{Path, PathBuf};

/// A loaded document: raw bytes plus the source's directory component.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Raw document bytes, not yet parsed.
    pub data: Vec<u8>,
    /// Directory component of the source identifier, `.` when it has none.
    pub dir: String,
}

/// Resolves source identifiers to document bytes.
pub trait DocumentLoader {
    fn load(&self, source: &str) -> MergeResult<LoadedDocument>;
}

/// Filesystem-backed loader rooted at a base directory.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    base_dir: PathBuf,
}

impl FsLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl DocumentLoader for FsLoader {
    fn load(&self, source: &str) -> MergeResult<LoadedDocument> {
        let path = self.base_dir.join(source);
        let data = std::fs::read(&path).map_err(|error| MergeError::Load {
            source_id: source.to_string(),
            error,
        })?;
        Ok(LoadedDocument {
            data,
            dir: source_dir(source),
        })
    }
}

/// Directory component of a source identifier, relative to the loader base.
fn source_dir(source: &str) -> String {
    match Path::new(source).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            parent.to_string_lossy().replace('\\', "/")
        }
        _ => ".".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_source_dir_of_bare_filename() {
        assert_eq!(source_dir("input.yaml"), ".");
    }

    #[test]
    fn test_source_dir_of_nested_source() {
        assert_eq!(source_dir("host-dir/input.yaml"), "host-dir");
        assert_eq!(source_dir("a/b/input.yaml"), "a/b");
    }

    #[test]
    fn test_fs_loader_reads_relative_to_base() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("common");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("input.yaml"), "a: 1\n").unwrap();

        let loader = FsLoader::new(temp.path());
        let doc = loader.load("common/input.yaml").unwrap();
        assert_eq!(doc.data, b"a: 1\n");
        assert_eq!(doc.dir, "common");
    }

    #[test]
    fn test_fs_loader_wraps_missing_file_with_source() {
        let temp = TempDir::new().unwrap();
        let loader = FsLoader::new(temp.path());
        let err = loader.load("missing.yaml").unwrap_err();
        assert!(
            matches!(err, MergeError::Load { ref source_id, .. } if source_id == "missing.yaml")
        );
    }
}
