//! Release preconditions: clean tree, release branch, fresh tags.

use tracing::debug;

use crate::error::{DeployError, Result};
use crate::git::Repository;

/// Gates that must pass before anything is fetched, tagged or published
pub struct Preflight<'a, R: Repository + ?Sized> {
    repo: &'a R,
    release_branches: &'a [String],
    remote: &'a str,
}

impl<'a, R: Repository + ?Sized> Preflight<'a, R> {
    pub fn new(repo: &'a R, release_branches: &'a [String], remote: &'a str) -> Self {
        Preflight {
            repo,
            release_branches,
            remote,
        }
    }

    /// True iff nothing is staged, modified or untracked
    pub fn is_working_tree_clean(&self) -> Result<bool> {
        self.repo.is_clean()
    }

    /// True iff HEAD is one of the release branches; detached HEAD never is
    pub fn is_on_release_branch(&self) -> Result<bool> {
        let branch = self.repo.current_branch()?;
        debug!(branch = ?branch, "current branch");
        Ok(branch.is_some_and(|name| self.release_branches.iter().any(|b| *b == name)))
    }

    /// Force-fetch tags so local tags match the remote
    pub fn fetch_remote_tags(&self) -> Result<()> {
        self.repo.fetch_tags(self.remote)
    }

    pub fn ensure_clean(&self) -> Result<()> {
        if !self.is_working_tree_clean()? {
            return Err(DeployError::precondition(
                "Please make sure there are no changes",
            ));
        }
        Ok(())
    }

    pub fn ensure_release_branch(&self) -> Result<()> {
        if !self.is_on_release_branch()? {
            return Err(DeployError::precondition(format!(
                "Releases are allowed to tag from {} branch",
                self.release_branches.join("/")
            )));
        }
        Ok(())
    }
}
