/// Centralized error types for hunk-miner using thiserror
///
/// The adapter and parser surface typed errors so callers can tell a missing
/// repository from a malformed patch. The façade converts some of them into
/// `false`/`None` for its legacy surface.
use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum MinerError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Patch error: {0}")]
    Patch(#[from] PatchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised by the object store adapter and the tree differ
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git repository not found at: {0}")]
    NoRepository(String),

    #[error("HEAD does not point to a commit in repository: {0}")]
    UnbornBranch(String),

    #[error("Unknown revision: {0}")]
    UnknownRevision(String),

    #[error("Object {0} is not a commit")]
    NotACommit(String),

    #[error("Object {0} is not a blob")]
    NotABlob(String),

    #[error("Failed to load object {id}: {reason}")]
    ObjectLoadFailed { id: String, reason: String },

    #[error("Failed to diff trees: {0}")]
    DiffFailed(String),

    #[error("Repository is not connected")]
    NotConnected,
}

/// Errors raised while turning a unified diff into code hunks
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Malformed hunk header in '{path}': {header}")]
    InvalidHeader { path: String, header: String },

    #[error(
        "Hunk '{header}' in '{path}' declares {expected} {side} lines but the body has {actual}"
    )]
    CountMismatch {
        path: String,
        header: String,
        side: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unexpected line in hunk body of '{path}': {line}")]
    UnexpectedLine { path: String, line: String },

    #[error(
        "Hunk '{header}' in '{path}' reaches line {end} but the post-image has {available} lines"
    )]
    SliceOutOfBounds {
        path: String,
        header: String,
        end: usize,
        available: usize,
    },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<anyhow::Error> for MinerError {
    fn from(err: anyhow::Error) -> Self {
        MinerError::Other(format!("{:#}", err))
    }
}

impl MinerError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        MinerError::Other(msg.into())
    }

    /// True for errors caused by caller input (bad revision, bad config)
    /// rather than by the repository or the filesystem
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            MinerError::Git(GitError::UnknownRevision(_))
                | MinerError::Git(GitError::NotACommit(_))
                | MinerError::Git(GitError::NotABlob(_))
                | MinerError::Config(ConfigError::InvalidValue { .. })
        )
    }
}
