//! Git operations abstraction layer
//!
//! The release pipeline only talks to version control through the
//! [Repository] trait. Two implementations exist:
//!
//! - [repository::Git2Repository]: local reads and tag creation through `git2`,
//!   network operations (`fetch`, `push`) through the system `git` binary
//! - [mock::MockRepository]: in-memory history that records every mutating call
//!
//! ```rust
//! # use git_deploy::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> git_deploy::Result<()> {
//! let head = repo.resolve_ref("HEAD")?.expect("repository has commits");
//! let commits = repo.commits_between(None, &head)?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{MockRepository, RepoCall};
pub use repository::Git2Repository;

use crate::domain::CommitRecord;
use crate::error::Result;

/// Version-control capability consumed by the release pipeline
///
/// ## Error Handling
///
/// Every method returns [crate::error::Result]. A failing query or command is
/// an error; "not found" answers are expressed in the return value
/// (`Ok(None)`, `Ok(false)`) instead.
pub trait Repository {
    /// True iff there are no staged, unstaged or untracked changes
    fn is_clean(&self) -> Result<bool>;

    /// Name of the checked out branch, `None` when HEAD is detached
    fn current_branch(&self) -> Result<Option<String>>;

    /// Fetch all tags from `remote`, overwriting diverged local tags
    fn fetch_tags(&self, remote: &str) -> Result<()>;

    /// Resolve a revision to a full commit hash, `None` if it does not exist
    fn resolve_ref(&self, reference: &str) -> Result<Option<String>>;

    /// All tag names in the repository
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Commits reachable from `to` but not from `from`, newest first.
    ///
    /// With `from = None` the whole history reachable from `to` is returned.
    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitRecord>>;

    /// Create a lightweight tag on the current HEAD commit
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Push a single tag to `remote`
    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;
}

impl<T: Repository + ?Sized> Repository for &T {
    fn is_clean(&self) -> Result<bool> {
        (**self).is_clean()
    }

    fn current_branch(&self) -> Result<Option<String>> {
        (**self).current_branch()
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        (**self).fetch_tags(remote)
    }

    fn resolve_ref(&self, reference: &str) -> Result<Option<String>> {
        (**self).resolve_ref(reference)
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        (**self).list_tags()
    }

    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitRecord>> {
        (**self).commits_between(from, to)
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        (**self).create_tag(name)
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        (**self).push_tag(remote, name)
    }
}
