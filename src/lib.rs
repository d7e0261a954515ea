//! # hunk-miner - Structured change hunks from a local git repository
//!
//! Mining and analysis tools usually want diffs as data, not as patch text.
//! This crate binds to one local repository and, for two commits, returns
//! every changed file's hunks paired with the exact post-image lines they
//! cover.
//!
//! ## Pipeline
//!
//! ```text
//! GitConnector::get_change_hunks(base, head, ext)
//!   -> ObjectStore::find_commit        (resolve base and head)
//!   -> TreeDiffer::diff                (rename-aware tree diff, suffix filter)
//!   -> ObjectStore::load_blob          (post-image of each entry)
//!   -> hunk::parse_hunks               (headers, bodies, post-image slices)
//!   => HashMap<new path, Vec<CodeHunk>>
//! ```
//!
//! ## Modules
//!
//! - [`connector`]: the `GitConnector` façade
//! - [`git`]: repository access and tree diffing over `git2`
//! - [`hunk`]: unified-diff hunk parsing
//! - [`config`]: diff and history settings with environment overrides
//! - [`error`]: error types
//! - [`paths`]: platform configuration paths
//!
//! ## Usage Example
//!
//! ```no_run
//! use hunk_miner::connector::GitConnector;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut connector = GitConnector::new("/path/to/repo");
//!     if !connector.connect() {
//!         anyhow::bail!("not a git repository");
//!     }
//!
//!     let hunks = connector.get_change_hunks("HEAD~1", "HEAD", Some(".rs"))?;
//!     for (path, file_hunks) in &hunks {
//!         println!("{}: {} hunks", path, file_hunks.len());
//!     }
//!
//!     connector.close();
//!     Ok(())
//! }
//! ```

/// Configuration management with environment variable overrides
pub mod config;

/// The repository façade
pub mod connector;

/// Error types and utilities
pub mod error;

/// Git object store access and tree diffing
pub mod git;

/// Unified-diff hunk parsing
pub mod hunk;

/// Platform configuration paths
pub mod paths;

pub use connector::{ChangeHunks, GitConnector};
pub use error::MinerError;
pub use hunk::CodeHunk;
