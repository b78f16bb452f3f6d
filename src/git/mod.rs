//! Git operations abstraction layer
//!
//! The release pipeline only talks to version control through the
//! [VersionControl] trait, so the workflow can be driven against a real
//! repository or a scripted one.
//!
//! - [repository::GitRepository]: git2 for repository queries and local tags,
//!   the `git` executable for staging, committing and network operations
//! - [mock::MockVersionControl]: in-memory implementation for tests

pub mod mock;
pub mod repository;

pub use mock::MockVersionControl;
pub use repository::GitRepository;

use crate::error::Result;

/// Version control operations needed to cut a release.
///
/// Every mutating operation either succeeds or returns an error carrying the
/// tool's own error text; callers never retry.
pub trait VersionControl {
    /// Whether tracked files differ from `HEAD` (staged or not).
    ///
    /// Untracked files are ignored, matching `git diff HEAD --quiet`.
    fn is_dirty(&self) -> Result<bool>;

    /// Stage every change in the working tree (`git add . --all`)
    fn stage_all(&self) -> Result<()>;

    /// Commit staged changes with `message`
    fn commit(&self, message: &str) -> Result<()>;

    /// Create an annotated tag on `HEAD`
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push the current branch along with reachable annotated tags.
    ///
    /// Returns the combined output of the push for display.
    fn push_follow_tags(&self) -> Result<String>;

    /// Push a single tag to `remote`
    fn push_tag(&self, remote: &str, tag: &str) -> Result<()>;

    /// Name of the checked-out branch, `None` when `HEAD` is detached or unborn
    fn current_branch(&self) -> Result<Option<String>>;

    /// The `branch.<name>.remote` setting, if configured
    fn remote_for_branch(&self, branch: &str) -> Result<Option<String>>;

    /// URL of the named remote
    fn remote_url(&self, remote: &str) -> Result<String>;

    /// Full SHA of the `HEAD` commit
    fn head_commit(&self) -> Result<String>;

    /// Whether `refs/tags/<tag>` exists locally
    fn local_tag_exists(&self, tag: &str) -> Result<bool>;

    /// Whether `refs/tags/<tag>` exists on `remote`
    fn remote_tag_exists(&self, remote: &str, tag: &str) -> Result<bool>;
}
