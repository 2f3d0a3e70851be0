//! Recursive document merging.
//!
//! The [`Merger`] accumulates documents into a single tree: the first
//! document becomes the root unmodified, later documents are merged key by
//! key under the compiled [`MergePolicy`]. Processing is strictly
//! sequential in caller-supplied order; the first conflict aborts the whole
//! operation.

use crate::error::{MergeError, MergeResult, ValueKind};
use crate::loader::{DocumentLoader, FsLoader};
use crate::options::MergeOptions;
use crate::policy::MergePolicy;
use crate::resolve::resolve_paths;
use serde_json::{Map, Value};
use tracing::debug;

/// Merge YAML files into a single document tree.
///
/// For each source in order: load relative to `options.base_dir`, resolve
/// relative paths against the source's own directory, merge into the
/// accumulated root. Serialization of the result is left to the caller.
pub fn merge_files<S: AsRef<str>>(options: &MergeOptions, sources: &[S]) -> MergeResult<Value> {
    let loader = FsLoader::new(&options.base_dir);
    merge_with_loader(options, &loader, sources)
}

/// Merge documents supplied by an arbitrary [`DocumentLoader`].
pub fn merge_with_loader<S: AsRef<str>>(
    options: &MergeOptions,
    loader: &dyn DocumentLoader,
    sources: &[S],
) -> MergeResult<Value> {
    let mut merger = Merger::from_options(options)?;
    for source in sources {
        let source = source.as_ref();
        debug!(source = %source, "merging document");
        let document = loader.load(source)?;
        merger.merge_bytes(source, &document.dir, &document.data)?;
    }
    Ok(merger.into_root())
}

/// Accumulates documents into a single merged tree.
///
/// On error the accumulated tree may be partially mutated; callers must
/// discard it. Each merge operation owns its own `Merger`, so independent
/// operations can run on separate threads without coordination.
#[derive(Debug)]
pub struct Merger {
    policy: MergePolicy,
    root: Option<Map<String, Value>>,
}

impl Merger {
    /// Create a merger with a compiled policy.
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy, root: None }
    }

    /// Compile the policy from options and create a merger.
    ///
    /// Fails on conflicting policy patterns, before any document is read.
    pub fn from_options(options: &MergeOptions) -> MergeResult<Self> {
        Ok(Self::new(MergePolicy::from_options(options)?))
    }

    /// Parse raw YAML bytes and merge them, resolving relative paths against
    /// `source_dir` first. `source` is used for error reporting only; merge
    /// conflicts come back wrapped with it.
    pub fn merge_bytes(&mut self, source: &str, source_dir: &str, data: &[u8]) -> MergeResult<()> {
        let value: Value = serde_yaml::from_slice(data).map_err(|error| MergeError::Parse {
            source_id: source.to_string(),
            error,
        })?;
        let Value::Object(document) = value else {
            return Err(MergeError::NotAMapping {
                source_id: source.to_string(),
                kind: ValueKind::of(&value),
            });
        };
        self.merge_document(document, source_dir)
            .map_err(|error| error.for_document(source))
    }

    /// Merge an already-parsed document mapping.
    ///
    /// An empty `source_dir` disables path resolution for this document.
    /// The first document becomes the accumulated root without a merge pass.
    pub fn merge_document(
        &mut self,
        mut document: Map<String, Value>,
        source_dir: &str,
    ) -> MergeResult<()> {
        if !source_dir.is_empty() {
            resolve_paths(&self.policy, &mut document, source_dir, "$");
        }
        match self.root {
            None => {
                self.root = Some(document);
                Ok(())
            }
            Some(ref mut root) => merge_mapping(&self.policy, root, document, "$"),
        }
    }

    /// The merged tree. An empty mapping if no document was merged.
    pub fn into_root(self) -> Value {
        Value::Object(self.root.unwrap_or_default())
    }
}

/// Merge `src`'s keys into `dst` in place, recursively. Policy is queried
/// at each key's own context path. The first conflict aborts, leaving `dst`
/// partially merged.
fn merge_mapping(
    policy: &MergePolicy,
    dst: &mut Map<String, Value>,
    src: Map<String, Value>,
    context_path: &str,
) -> MergeResult<()> {
    for (key, sv) in src {
        let path = format!("{context_path}.{key}");
        match (dst.remove(&key), sv) {
            // Key absent: a source mapping still recurses through a fresh
            // mapping so deeper merges share one code path.
            (None, Value::Object(sv)) => {
                let mut dv = Map::new();
                merge_mapping(policy, &mut dv, sv, &path)?;
                dst.insert(key, Value::Object(dv));
            }
            (None, sv) => {
                dst.insert(key, sv);
            }

            // Sequences: concatenate destination-first, or replace wholesale
            // under an overwrite policy. Never merged element-wise.
            (Some(Value::Array(mut dv)), Value::Array(sv)) => {
                if policy.is_overwrite(&path) {
                    debug!(path = %path, "sequence replaced (overwrite)");
                    dv = sv;
                } else {
                    dv.extend(sv);
                }
                dst.insert(key, Value::Array(dv));
            }

            // Mappings merge deep.
            (Some(Value::Object(mut dv)), Value::Object(sv)) => {
                merge_mapping(policy, &mut dv, sv, &path)?;
                dst.insert(key, Value::Object(dv));
            }

            // A structured source value over a differently-shaped destination
            // is a hard error regardless of overwrite settings.
            (Some(dv), sv @ (Value::Array(_) | Value::Object(_))) => {
                return Err(MergeError::TypeMismatch {
                    path,
                    src: ValueKind::of(&sv),
                    dst: ValueKind::of(&dv),
                });
            }

            // Scalars: equal values are an idempotent no-op; different
            // values conflict unless the policy says overwrite.
            (Some(dv), sv) => {
                if dv == sv {
                    dst.insert(key, dv);
                } else if policy.is_overwrite(&path) {
                    dst.insert(key, sv);
                } else {
                    return Err(MergeError::DuplicateKey { path });
                }
            }
        }
    }
    Ok(())
}
