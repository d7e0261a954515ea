use crate::config::parse_flag;
use crate::error::GitError;
use crate::git::types::{CommitRef, ObjectId};
use git2::{ErrorCode, ObjectType, Repository, RepositoryOpenFlags, Revwalk, Sort};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Git environment overrides applied during repository discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// `GIT_DIR`: open this git directory, skipping the upward search
    pub git_dir: Option<PathBuf>,
    /// `GIT_WORK_TREE`
    pub work_tree: Option<PathBuf>,
    /// `GIT_CEILING_DIRECTORIES`: the upward search never enters these
    pub ceiling_dirs: Vec<PathBuf>,
    /// `GIT_DISCOVERY_ACROSS_FILESYSTEM`
    pub across_filesystems: bool,
}

impl Discovery {
    /// Read the overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let ceiling_dirs = non_empty("GIT_CEILING_DIRECTORIES")
            .map(|dirs| {
                std::env::split_paths(&dirs)
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let across_filesystems = non_empty("GIT_DISCOVERY_ACROSS_FILESYSTEM")
            .and_then(|value| value.to_str().and_then(parse_flag))
            .unwrap_or(false);

        Self {
            git_dir: non_empty("GIT_DIR").map(PathBuf::from),
            work_tree: non_empty("GIT_WORK_TREE").map(PathBuf::from),
            ceiling_dirs,
            across_filesystems,
        }
    }

    fn open_flags(&self) -> RepositoryOpenFlags {
        let mut flags = RepositoryOpenFlags::empty();
        if self.across_filesystems {
            flags |= RepositoryOpenFlags::CROSS_FS;
        }
        if self.git_dir.is_some() {
            flags |= RepositoryOpenFlags::NO_SEARCH;
        }
        flags
    }
}

/// Read-only handle on one local git repository
///
/// Owns the `git2::Repository`; dropping the store releases it.
pub struct ObjectStore {
    repo: Repository,
    work_dir: PathBuf,
}

impl ObjectStore {
    /// Discover and open the repository containing `working_dir`, honoring
    /// the git environment variables read by [`Discovery::from_env`]
    pub fn open<P: AsRef<Path>>(working_dir: P) -> Result<Self, GitError> {
        Self::open_with(working_dir, &Discovery::from_env())
    }

    /// Discover and open the repository containing `working_dir`
    ///
    /// Discovery starts at `working_dir` and walks upward, stopping below
    /// any ceiling directory. A set `git_dir` is opened directly instead.
    /// A repository whose `HEAD` does not yet point at a commit is rejected.
    pub fn open_with<P: AsRef<Path>>(
        working_dir: P,
        discovery: &Discovery,
    ) -> Result<Self, GitError> {
        let working_dir = working_dir.as_ref();
        let start = discovery.git_dir.as_deref().unwrap_or(working_dir);

        let repo = Repository::open_ext(start, discovery.open_flags(), &discovery.ceiling_dirs)
            .map_err(|e| {
                tracing::debug!("Repository discovery from {} failed: {}", start.display(), e);
                GitError::NoRepository(working_dir.display().to_string())
            })?;

        if let Some(work_tree) = &discovery.work_tree {
            repo.set_workdir(work_tree, false).map_err(|e| {
                tracing::warn!(
                    "Cannot use {} as the work tree: {}",
                    work_tree.display(),
                    e.message()
                );
                GitError::NoRepository(work_tree.display().to_string())
            })?;
        }

        if let Err(e) = repo.head() {
            tracing::warn!(
                "Rejecting repository at {}: HEAD is unresolvable ({})",
                repo.path().display(),
                e.message()
            );
            return Err(GitError::UnbornBranch(repo.path().display().to_string()));
        }

        let work_dir = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();

        tracing::info!("Opened git repository at: {}", work_dir.display());

        Ok(Self { repo, work_dir })
    }

    /// Working tree root, or the git directory of a bare repository
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Resolve any revision expression git understands (full or short
    /// hash, branch, tag, `HEAD~2`, ...) to an object id
    pub fn resolve(&self, rev: &str) -> Result<ObjectId, GitError> {
        match self.repo.revparse_single(rev) {
            Ok(object) => Ok(object.id().into()),
            Err(e)
                if matches!(
                    e.code(),
                    ErrorCode::NotFound | ErrorCode::InvalidSpec | ErrorCode::Ambiguous
                ) =>
            {
                Err(GitError::UnknownRevision(rev.to_string()))
            }
            Err(e) => Err(GitError::ObjectLoadFailed {
                id: rev.to_string(),
                reason: e.message().to_string(),
            }),
        }
    }

    /// Load the commit named by `id`; annotated tags are peeled
    pub fn load_commit(&self, id: ObjectId) -> Result<CommitRef, GitError> {
        let object = self
            .repo
            .find_object(id.raw(), None)
            .map_err(|e| load_failed(id, &e))?;

        match object.kind() {
            Some(ObjectType::Commit) | Some(ObjectType::Tag) => {}
            _ => return Err(GitError::NotACommit(id.to_hex())),
        }

        let commit = object
            .peel_to_commit()
            .map_err(|_| GitError::NotACommit(id.to_hex()))?;

        Ok(CommitRef::from_git(&commit))
    }

    /// `resolve` followed by `load_commit`
    pub fn find_commit(&self, rev: &str) -> Result<CommitRef, GitError> {
        let id = self.resolve(rev)?;
        self.load_commit(id)
    }

    /// Full uncompressed contents of the blob named by `id`
    pub fn load_blob(&self, id: ObjectId) -> Result<Vec<u8>, GitError> {
        let object = self
            .repo
            .find_object(id.raw(), None)
            .map_err(|e| load_failed(id, &e))?;

        let blob = object
            .into_blob()
            .map_err(|_| GitError::NotABlob(id.to_hex()))?;

        Ok(blob.content().to_vec())
    }

    /// Commit at `HEAD`, or `None` on any failure
    pub fn head(&self) -> Option<CommitRef> {
        match self.find_commit("HEAD") {
            Ok(commit) => Some(commit),
            Err(e) => {
                tracing::warn!("Failed to load HEAD commit: {}", e);
                None
            }
        }
    }

    /// Lazily walk history from `HEAD` in topological order
    ///
    /// Each call starts a fresh walk.
    pub fn log(&self, first_parent: bool) -> Result<CommitLog<'_>, GitError> {
        let walk_failed = |e: git2::Error| GitError::ObjectLoadFailed {
            id: "HEAD".to_string(),
            reason: e.message().to_string(),
        };

        let mut revwalk = self.repo.revwalk().map_err(walk_failed)?;
        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .map_err(walk_failed)?;
        if first_parent {
            revwalk.simplify_first_parent().map_err(walk_failed)?;
        }
        revwalk.push_head().map_err(walk_failed)?;

        Ok(CommitLog {
            repo: &self.repo,
            revwalk,
        })
    }

    pub(crate) fn repository(&self) -> &Repository {
        &self.repo
    }
}

fn load_failed(id: ObjectId, e: &git2::Error) -> GitError {
    GitError::ObjectLoadFailed {
        id: id.to_hex(),
        reason: e.message().to_string(),
    }
}

/// Lazy commit history produced by [`ObjectStore::log`]
pub struct CommitLog<'repo> {
    repo: &'repo Repository,
    revwalk: Revwalk<'repo>,
}

impl Iterator for CommitLog<'_> {
    type Item = Result<CommitRef, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = match self.revwalk.next()? {
            Ok(oid) => oid,
            Err(e) => {
                return Some(Err(GitError::ObjectLoadFailed {
                    id: "revwalk".to_string(),
                    reason: e.message().to_string(),
                }));
            }
        };

        Some(
            self.repo
                .find_commit(oid)
                .map(|commit| CommitRef::from_git(&commit))
                .map_err(|e| load_failed(oid.into(), &e)),
        )
    }
}
