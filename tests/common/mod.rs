// Shared fixtures for integration tests
#![allow(dead_code)]

use git2::{IndexAddOption, Repository, Signature};
use hunk_miner::GitConnector;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create an empty temporary repository
pub fn create_test_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = Repository::init(&repo_path).unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    (dir, repo_path, repo)
}

/// Write files into the working tree
pub fn write_files(repo: &Repository, files: &[(&str, &[u8])]) {
    for (path, content) in files {
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();
    }
}

/// Delete files from the working tree
pub fn remove_files(repo: &Repository, paths: &[&str]) {
    for path in paths {
        std::fs::remove_file(repo.workdir().unwrap().join(path)).unwrap();
    }
}

/// Stage the whole working tree (including removals) and commit on HEAD
pub fn commit_all(repo: &Repository, message: &str) -> String {
    let sig = Signature::now("Test User", "test@example.com").unwrap();

    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.update_all(["*"].iter(), None).unwrap();
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
        .to_string()
}

/// Bytes of `path` as of `rev`
pub fn blob_at(repo: &Repository, rev: &str, path: &str) -> Vec<u8> {
    let commit = repo.revparse_single(rev).unwrap().peel_to_commit().unwrap();
    let entry = commit.tree().unwrap().get_path(Path::new(path)).unwrap();
    repo.find_blob(entry.id()).unwrap().content().to_vec()
}

/// Open a connector on `path`, panicking if it cannot connect
pub fn connect(path: &Path) -> GitConnector {
    let mut connector = GitConnector::new(path);
    assert!(connector.connect(), "connector should open {}", path.display());
    connector
}

/// Lines `[start, start + count)` (1-based) of `content`, terminators kept
pub fn lines_of(content: &str, start: usize, count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    content
        .split_inclusive('\n')
        .skip(start - 1)
        .take(count)
        .collect()
}
