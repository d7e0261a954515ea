use crate::config::DiffConfig;
use crate::error::GitError;
use crate::git::types::{ChangeKind, CommitRef, DEV_NULL, DiffRecord};
use git2::{Diff, DiffDelta, DiffFindOptions, DiffOptions, FileMode, Patch, Repository};

/// Computes per-file unified diffs between the trees of two commits
///
/// Lines are compared byte for byte. Each record carries a patch rendered
/// into its own buffer, so a record's text never depends on its neighbours.
pub struct TreeDiffer<'repo> {
    repo: &'repo Repository,
    config: DiffConfig,
}

impl<'repo> TreeDiffer<'repo> {
    pub fn new(repo: &'repo Repository, config: DiffConfig) -> Self {
        Self { repo, config }
    }

    /// Diff `base` against `head`
    ///
    /// With a non-empty `suffix`, entries whose new path does not end in it
    /// (case-sensitive, plain string match) are dropped. Deletions are always
    /// dropped. The diff is directional: swapping the commits yields the
    /// reverse patch.
    pub fn diff(
        &self,
        base: &CommitRef,
        head: &CommitRef,
        suffix: Option<&str>,
    ) -> Result<Vec<DiffRecord>, GitError> {
        let diff = self.scan(base, head)?;
        let suffix = suffix.filter(|s| !s.is_empty());

        let mut records = Vec::new();
        for (idx, delta) in diff.deltas().enumerate() {
            let Some(change_kind) = ChangeKind::from_delta(delta.status()) else {
                continue;
            };
            if change_kind == ChangeKind::Delete {
                continue;
            }

            let new_path = path_of(&delta, Side::New);
            if let Some(suffix) = suffix
                && !new_path.ends_with(suffix)
            {
                continue;
            }

            let old_path = match change_kind {
                ChangeKind::Add => DEV_NULL.to_string(),
                _ => path_of(&delta, Side::Old),
            };

            let patch_text = render_patch(&diff, idx, &old_path, &new_path)?;

            // a gitlink names a commit in the submodule's repository
            let new_blob_id = match delta.new_file().mode() {
                FileMode::Commit => None,
                _ => Some(delta.new_file().id().into()),
            };

            records.push(DiffRecord {
                old_path,
                new_path,
                change_kind,
                new_blob_id,
                patch_text,
            });
        }

        tracing::debug!(
            "Diffed {}..{}: {} of {} entries kept",
            base.id,
            head.id,
            records.len(),
            diff.deltas().len()
        );

        Ok(records)
    }

    fn scan(&self, base: &CommitRef, head: &CommitRef) -> Result<Diff<'repo>, GitError> {
        let old_tree = self
            .repo
            .find_tree(base.tree_id.raw())
            .map_err(|e| tree_load_failed(base, &e))?;
        let new_tree = self
            .repo
            .find_tree(head.tree_id.raw())
            .map_err(|e| tree_load_failed(head, &e))?;

        let mut opts = DiffOptions::new();
        opts.context_lines(self.config.context_lines);

        let mut diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut opts))
            .map_err(diff_failed)?;

        if self.config.detect_renames {
            let mut find = DiffFindOptions::new();
            find.renames(true)
                .rename_threshold(self.config.rename_threshold)
                .copies(self.config.detect_copies)
                .copy_threshold(self.config.rename_threshold);
            diff.find_similar(Some(&mut find)).map_err(diff_failed)?;
        }

        Ok(diff)
    }
}

#[derive(Clone, Copy)]
enum Side {
    Old,
    New,
}

fn path_of(delta: &DiffDelta<'_>, side: Side) -> String {
    let file = match side {
        Side::Old => delta.old_file(),
        Side::New => delta.new_file(),
    };
    file.path_bytes()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .unwrap_or_else(|| DEV_NULL.to_string())
}

/// Render entry `idx` of `diff` as a standalone `diff --git` block
fn render_patch(
    diff: &Diff<'_>,
    idx: usize,
    old_path: &str,
    new_path: &str,
) -> Result<String, GitError> {
    match Patch::from_diff(diff, idx).map_err(diff_failed)? {
        Some(mut patch) => {
            let buf = patch.to_buf().map_err(diff_failed)?;
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
        // libgit2 builds no patch for binary content
        None => Ok(binary_stub(old_path, new_path)),
    }
}

fn binary_stub(old_path: &str, new_path: &str) -> String {
    let header_old = if old_path == DEV_NULL { new_path } else { old_path };
    let side = |prefix: &str, path: &str| {
        if path == DEV_NULL {
            DEV_NULL.to_string()
        } else {
            format!("{}{}", prefix, path)
        }
    };
    format!(
        "diff --git a/{} b/{}\nBinary files {} and {} differ\n",
        header_old,
        new_path,
        side("a/", old_path),
        side("b/", new_path)
    )
}

fn diff_failed(e: git2::Error) -> GitError {
    GitError::DiffFailed(e.message().to_string())
}

fn tree_load_failed(commit: &CommitRef, e: &git2::Error) -> GitError {
    GitError::ObjectLoadFailed {
        id: commit.tree_id.to_hex(),
        reason: e.message().to_string(),
    }
}
