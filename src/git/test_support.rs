//! Throw-away repositories for unit tests.

use crate::git::types::ObjectId;
use git2::{IndexAddOption, Repository, Signature};
use std::path::Path;
use tempfile::TempDir;

pub(crate) struct TestRepo {
    dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    pub(crate) fn init() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let repo = Repository::init(dir.path()).expect("init repository");
        Self { dir, repo }
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn write(&self, name: &str, content: impl AsRef<[u8]>) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(path, content).expect("write file");
    }

    pub(crate) fn remove(&self, name: &str) {
        std::fs::remove_file(self.dir.path().join(name)).expect("remove file");
    }

    /// Stage every change in the working tree and commit it on HEAD
    pub(crate) fn commit(&self, message: &str) -> ObjectId {
        let parents: Vec<ObjectId> = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok())
            .map(|commit| commit.id().into())
            .into_iter()
            .collect();
        self.commit_with_parents(message, &parents, Some("HEAD"))
    }

    /// Stage the working tree and commit it with explicit parents,
    /// moving `update_ref` when given
    pub(crate) fn commit_with_parents(
        &self,
        message: &str,
        parents: &[ObjectId],
        update_ref: Option<&str>,
    ) -> ObjectId {
        let mut index = self.repo.index().expect("open index");
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .expect("stage files");
        index.update_all(["*"].iter(), None).expect("stage removals");
        index.write().expect("write index");

        let tree_id = index.write_tree().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");
        let sig = Signature::now("Test", "test@example.com").expect("signature");

        let parents: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|id| self.repo.find_commit(id.raw()).expect("find parent"))
            .collect();
        let parents: Vec<&git2::Commit<'_>> = parents.iter().collect();

        self.repo
            .commit(update_ref, &sig, &sig, message, &tree, &parents)
            .expect("commit")
            .into()
    }

    /// Commit HEAD's tree with `name` turned into a submodule pointer at
    /// `target`, which need not exist locally
    pub(crate) fn commit_gitlink(&self, name: &str, target: &str, message: &str) -> ObjectId {
        let head = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let head_tree = head.as_ref().map(|commit| commit.tree().expect("head tree"));

        let mut builder = self
            .repo
            .treebuilder(head_tree.as_ref())
            .expect("tree builder");
        let target = git2::Oid::from_str(target).expect("gitlink target");
        builder
            .insert(name, target, i32::from(git2::FileMode::Commit))
            .expect("insert gitlink");
        let tree_id = builder.write().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");

        let sig = Signature::now("Test", "test@example.com").expect("signature");
        let parents: Vec<&git2::Commit<'_>> = head.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit")
            .into()
    }

    /// Id of the blob at `name` in the tree of `commit`
    pub(crate) fn blob_id(&self, commit: ObjectId, name: &str) -> ObjectId {
        let commit = self.repo.find_commit(commit.raw()).expect("find commit");
        let tree = commit.tree().expect("commit tree");
        tree.get_path(Path::new(name)).expect("tree entry").id().into()
    }
}
