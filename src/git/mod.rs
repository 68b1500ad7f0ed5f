//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations the
//! release train performs on its working tree, allowing for a real
//! implementation and a mock implementation for testing.
//!
//! # Overview
//!
//! - [system::SystemGit]: runs the `git` binary for porcelain writes and uses
//!   `git2` for reads
//! - [mock::MockVersionControl]: records calls and replays scripted failures
//!
//! Every operation returns [GitResult]. A failed call is an ordinary value:
//! the caller decides whether it is a conflict to resolve, a rejected push to
//! report, or an error to propagate.

pub mod mock;
pub mod stash;
pub mod system;

pub use mock::MockVersionControl;
pub use stash::StashGuard;
pub use system::SystemGit;

use std::path::Path;
use thiserror::Error;

/// What kind of failure a git call ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A merge stopped with conflicts
    Conflict,
    /// The remote refused a push (non fast-forward or stale lease)
    Rejected,
    /// Anything else
    Command,
}

/// A recoverable failure of a single git call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("git {command} failed: {stderr}")]
pub struct GitFailure {
    pub command: String,
    pub kind: FailureKind,
    pub stderr: String,
}

impl GitFailure {
    pub fn new(command: impl Into<String>, kind: FailureKind, stderr: impl Into<String>) -> Self {
        GitFailure {
            command: command.into(),
            kind,
            stderr: stderr.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == FailureKind::Conflict
    }

    pub fn is_rejected(&self) -> bool {
        self.kind == FailureKind::Rejected
    }
}

/// Result of a single git call
pub type GitResult<T> = std::result::Result<T, GitFailure>;

/// How a merge treats conflicting hunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Stop on conflicts
    Default,
    /// Resolve conflicting hunks in favor of the checked-out branch (`-X ours`)
    PreferOurs,
}

/// Operations the release train needs from version control
///
/// All calls are blocking and act on one working tree, which the caller owns
/// exclusively for the duration of a run.
pub trait VersionControl {
    /// Root of the working tree
    fn workdir(&self) -> &Path;

    /// Update the remote-tracking refs of the given branches
    fn fetch(&self, remote: &str, branches: &[&str]) -> GitResult<()>;

    /// Resolve a revision to a full commit id
    fn rev_parse(&self, rev: &str) -> GitResult<String>;

    /// Read a file (relative to the working tree root) as of a revision
    fn show_file(&self, rev: &str, path: &Path) -> GitResult<String>;

    /// Whether tracked files have uncommitted changes
    fn is_dirty(&self) -> GitResult<bool>;

    /// Check out `branch`, (re)creating it at `start_point`
    fn checkout(&self, branch: &str, start_point: &str) -> GitResult<()>;

    /// Merge a revision with `--no-ff` and the given message
    fn merge(&self, rev: &str, message: &str, strategy: MergeStrategy) -> GitResult<()>;

    /// Abandon a merge that stopped with conflicts
    fn abort_merge(&self) -> GitResult<()>;

    fn reset_hard(&self, rev: &str) -> GitResult<()>;

    /// Stage a path relative to the working tree root
    fn add(&self, path: &Path) -> GitResult<()>;

    fn commit(&self, message: &str, allow_empty: bool) -> GitResult<()>;

    /// Push a branch; with a lease the push only succeeds while the remote
    /// branch still points at the expected commit
    fn push(&self, remote: &str, branch: &str, lease: Option<&str>) -> GitResult<()>;

    /// Stash local changes, returning whether anything was stashed
    fn stash(&self) -> GitResult<bool>;

    fn stash_pop(&self) -> GitResult<()>;
}

/// Name of the remote-tracking ref for a branch
pub fn remote_ref(remote: &str, branch: &str) -> String {
    format!("{}/{}", remote, branch)
}
