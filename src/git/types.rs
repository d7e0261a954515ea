//! Owned value types shared by the object store adapter and the tree differ.
//!
//! None of these borrow from the repository, so they outlive the adapter
//! that produced them.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Path reported for the missing side of an addition or a deletion.
pub const DEV_NULL: &str = "/dev/null";

/// Opaque object identifier, printed as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(git2::Oid);

impl ObjectId {
    /// Parse a full-length hex object id
    pub fn from_hex(hex: &str) -> Option<Self> {
        git2::Oid::from_str(hex).ok().map(Self)
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        self.0.to_string()
    }

    /// Raw identifier bytes (20 for SHA-1 repositories)
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// True for the all-zero id git uses for "no object"
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub(crate) fn raw(&self) -> git2::Oid {
        self.0
    }
}

impl From<git2::Oid> for ObjectId {
    fn from(oid: git2::Oid) -> Self {
        Self(oid)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Author or committer identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub when: DateTime<Utc>,
}

impl Signature {
    pub(crate) fn from_git(sig: &git2::Signature<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(sig.name_bytes()).into_owned(),
            email: String::from_utf8_lossy(sig.email_bytes()).into_owned(),
            when: DateTime::from_timestamp(sig.when().seconds(), 0).unwrap_or_default(),
        }
    }
}

/// A resolved commit
///
/// Only `tree_id` is needed to diff; the rest is carried for callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRef {
    pub id: ObjectId,
    pub tree_id: ObjectId,
    pub parent_ids: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl CommitRef {
    pub(crate) fn from_git(commit: &git2::Commit<'_>) -> Self {
        Self {
            id: commit.id().into(),
            tree_id: commit.tree_id().into(),
            parent_ids: commit.parent_ids().map(ObjectId::from).collect(),
            author: Signature::from_git(&commit.author()),
            committer: Signature::from_git(&commit.committer()),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        }
    }

    /// First line of the commit message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// How a path changed between two trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Modify,
    Delete,
    Rename,
    Copy,
}

impl ChangeKind {
    /// Map a libgit2 delta status; statuses that never appear in a
    /// tree-to-tree diff map to `None`
    pub(crate) fn from_delta(status: git2::Delta) -> Option<Self> {
        match status {
            git2::Delta::Added => Some(ChangeKind::Add),
            git2::Delta::Modified | git2::Delta::Typechange => Some(ChangeKind::Modify),
            git2::Delta::Deleted => Some(ChangeKind::Delete),
            git2::Delta::Renamed => Some(ChangeKind::Rename),
            git2::Delta::Copied => Some(ChangeKind::Copy),
            _ => None,
        }
    }
}

/// One changed file between two trees, with its standalone unified diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRecord {
    /// Path before the change, `/dev/null` for additions
    pub old_path: String,
    /// Path after the change, `/dev/null` for deletions
    pub new_path: String,
    pub change_kind: ChangeKind,
    /// Post-image blob; `None` for deletions and submodule commits
    pub new_blob_id: Option<ObjectId>,
    /// `diff --git` block for this file alone
    pub patch_text: String,
}

impl DiffRecord {
    /// True when the new side no longer exists
    pub fn is_deletion(&self) -> bool {
        self.change_kind == ChangeKind::Delete || self.new_path == DEV_NULL
    }
}
