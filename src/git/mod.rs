//! Git object store access and tree diffing
//!
//! Thin bindings over `git2`: opening a repository, resolving revisions,
//! reading blobs, walking history and rendering per-file unified diffs.

/// Per-file unified diffs between two commits
pub mod differ;
/// Repository handle, revision resolution and object loading
pub mod store;
/// Owned value types shared by the store and the differ
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use differ::TreeDiffer;
pub use store::{CommitLog, Discovery, ObjectStore};
pub use types::{ChangeKind, CommitRef, DEV_NULL, DiffRecord, ObjectId, Signature};
