//! Façade over one local repository
//!
//! `GitConnector` binds to a working-copy path, opens the object store on
//! [`GitConnector::connect`] and releases it on [`GitConnector::close`] or
//! drop. A connector is not meant to be shared between threads; open one
//! per thread against the same path instead.

use crate::config::Config;
use crate::error::{GitError, MinerError};
use crate::git::{CommitLog, CommitRef, DiffRecord, ObjectId, ObjectStore, TreeDiffer};
use crate::hunk::{CodeHunk, parse_hunks};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Change hunks keyed by post-image path
pub type ChangeHunks = HashMap<String, Vec<CodeHunk>>;

pub struct GitConnector {
    path: PathBuf,
    config: Config,
    store: Option<ObjectStore>,
}

impl GitConnector {
    /// Bind to `path` with the default configuration; nothing is opened yet
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self::with_config(path, Config::default())
    }

    pub fn with_config<P: Into<PathBuf>>(path: P, config: Config) -> Self {
        Self {
            path: path.into(),
            config,
            store: None,
        }
    }

    /// Open the repository; `false` when none is found or `HEAD` is unborn
    pub fn connect(&mut self) -> bool {
        self.store = None;
        match ObjectStore::open(&self.path) {
            Ok(store) => {
                self.store = Some(store);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to connect to {}: {}", self.path.display(), e);
                false
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    /// Release the repository handle; safe to call repeatedly
    pub fn close(&mut self) {
        if self.store.take().is_some() {
            tracing::debug!("Closed repository at {}", self.path.display());
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Option<&ObjectStore> {
        self.store.as_ref()
    }

    fn connected_store(&self) -> Result<&ObjectStore, GitError> {
        self.store.as_ref().ok_or(GitError::NotConnected)
    }

    /// History from `HEAD`, or `None` when it cannot be walked
    pub fn log(&self) -> Option<CommitLog<'_>> {
        let store = self.store.as_ref()?;
        match store.log(self.config.log.first_parent) {
            Ok(log) => Some(log),
            Err(e) => {
                tracing::warn!("Failed to walk history: {}", e);
                None
            }
        }
    }

    pub fn get_head_commit(&self) -> Option<CommitRef> {
        self.store.as_ref()?.head()
    }

    /// Hex id of the `HEAD` commit
    pub fn get_head_commit_id(&self) -> Option<String> {
        self.get_head_commit().map(|commit| commit.id.to_hex())
    }

    /// Resolve `rev` and load the commit it names
    pub fn get_commit(&self, rev: &str) -> Result<CommitRef, MinerError> {
        Ok(self.connected_store()?.find_commit(rev)?)
    }

    pub fn get_file_bytes(&self, id: ObjectId) -> Result<Vec<u8>, MinerError> {
        Ok(self.connected_store()?.load_blob(id)?)
    }

    /// Blob contents decoded as UTF-8 with invalid sequences replaced;
    /// `None` when the blob cannot be read
    pub fn get_file_content(&self, id: ObjectId) -> Option<String> {
        match self.get_file_bytes(id) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                tracing::warn!("Failed to read blob {}: {}", id, e);
                None
            }
        }
    }

    /// Per-file diff records between two revisions
    pub fn get_diff_records(
        &self,
        base_id: &str,
        head_id: &str,
        extension: Option<&str>,
    ) -> Result<Vec<DiffRecord>, MinerError> {
        let store = self.connected_store()?;
        let base = store.find_commit(base_id)?;
        let head = store.find_commit(head_id)?;

        let differ = TreeDiffer::new(store.repository(), self.config.diff.clone());
        Ok(differ.diff(&base, &head, extension)?)
    }

    /// Structured hunks of every file changed between `base_id` and
    /// `head_id`, optionally restricted to paths ending in `extension`
    ///
    /// Deleted files are left out. Binary files and submodule pointers map
    /// to an empty list. A patch that fails to parse aborts the whole call.
    pub fn get_change_hunks(
        &self,
        base_id: &str,
        head_id: &str,
        extension: Option<&str>,
    ) -> Result<ChangeHunks, MinerError> {
        let store = self.connected_store()?;
        let records = self.get_diff_records(base_id, head_id, extension)?;

        let mut file_hunks = ChangeHunks::with_capacity(records.len());
        for record in records {
            let hunks = match record.new_blob_id {
                Some(blob_id) => {
                    let bytes = store.load_blob(blob_id)?;
                    let content = String::from_utf8_lossy(&bytes);
                    parse_hunks(&record.new_path, &record.patch_text, &content)?
                }
                // submodule pointer: no post-image in this repository
                None => Vec::new(),
            };
            file_hunks.insert(record.new_path, hunks);
        }

        tracing::debug!(
            "Extracted hunks for {} files between {} and {}",
            file_hunks.len(),
            base_id,
            head_id
        );

        Ok(file_hunks)
    }
}
