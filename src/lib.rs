//! Policy-driven deep merge for multi-file YAML configurations.
//!
//! Merges several YAML documents into one combined document, resolving
//! overlapping keys according to a path-pattern policy: overwrite, append,
//! or error. String leaves at configured paths are rewritten relative to
//! each source document's directory so file references stay valid after
//! merging.

pub mod error;
pub mod loader;
pub mod merge;
pub mod options;
pub mod policy;
pub mod resolve;

pub use error::{MergeError, MergeResult, ValueKind};
pub use loader::{DocumentLoader, FsLoader, LoadedDocument};
pub use merge::{Merger, merge_files, merge_with_loader};
pub use options::MergeOptions;
pub use policy::MergePolicy;
