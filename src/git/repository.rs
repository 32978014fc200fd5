use crate::domain::CommitRecord;
use crate::error::{DeployError, Result};
use crate::process::{run_checked, CommandRunner, SystemRunner};
use chrono::{DateTime, FixedOffset};
use git2::{ErrorCode, Oid, Repository as Git2Repo, Sort, StatusOptions};
use std::path::Path;
use tracing::debug;

/// Repository backed by `git2` for local state and the `git` binary for remotes.
///
/// Fetch and push shell out so that the user's credential helpers, SSH agent
/// and `insteadOf` rewrites apply unchanged.
pub struct Git2Repository<R: CommandRunner = SystemRunner> {
    repo: Git2Repo,
    runner: R,
}

impl Git2Repository<SystemRunner> {
    /// Open or discover a git repository, running remote commands from its work tree
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| DeployError::precondition("Bare repositories cannot be released"))?
            .to_path_buf();

        Ok(Git2Repository {
            repo,
            runner: SystemRunner::in_dir(workdir),
        })
    }
}

impl<R: CommandRunner> Git2Repository<R> {
    /// Wrap an existing git2 repository with a custom command runner
    pub fn with_runner(repo: Git2Repo, runner: R) -> Self {
        Git2Repository { repo, runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn peel_commit(&self, reference: &str) -> Result<Oid> {
        let object = self.repo.revparse_single(reference)?;
        Ok(object.peel_to_commit()?.id())
    }

    fn record(&self, oid: Oid) -> Result<CommitRecord> {
        let commit = self.repo.find_commit(oid)?;
        let short_id = commit.as_object().short_id()?;
        let author = commit.author();

        Ok(CommitRecord::new(
            short_id.as_str().unwrap_or_default(),
            oid.to_string(),
            commit.message().unwrap_or("(empty message)"),
            author.name().unwrap_or("unknown"),
            signature_date(author.when())?,
        ))
    }
}

/// Convert a git signature timestamp into a chrono date in the author's offset
fn signature_date(time: git2::Time) -> Result<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).ok_or_else(|| {
        DeployError::version(format!("Invalid timezone offset: {}", time.offset_minutes()))
    })?;
    let utc = DateTime::from_timestamp(time.seconds(), 0).ok_or_else(|| {
        DeployError::version(format!("Invalid commit timestamp: {}", time.seconds()))
    })?;
    Ok(utc.with_timezone(&offset))
}

impl<R: CommandRunner> super::Repository for Git2Repository<R> {
    fn is_clean(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .include_ignored(false)
            .recurse_untracked_dirs(true);

        let statuses = self.repo.statuses(Some(&mut options))?;
        debug!(changes = statuses.len(), "working tree status");
        Ok(statuses.is_empty())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        // HEAD itself, unresolved, so an unborn branch still reports its name
        let head = self.repo.find_reference("HEAD")?;
        Ok(head
            .symbolic_target()
            .map(|target| target.strip_prefix("refs/heads/").unwrap_or(target).to_string()))
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        run_checked(&self.runner, "git", &["fetch", remote, "--tags", "--force"])?;
        Ok(())
    }

    fn resolve_ref(&self, reference: &str) -> Result<Option<String>> {
        match self.peel_commit(reference) {
            Ok(oid) => Ok(Some(oid.to_string())),
            Err(DeployError::Git(e))
                if matches!(
                    e.code(),
                    ErrorCode::NotFound | ErrorCode::InvalidSpec | ErrorCode::UnbornBranch
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;
        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitRecord>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(self.peel_commit(to)?)?;

        if let Some(from) = from {
            revwalk.hide(self.peel_commit(from)?)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            commits.push(self.record(oid?)?);
        }
        Ok(commits)
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.tag_lightweight(name, head.as_object(), false)?;
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        let refspec = format!("refs/tags/{}", name);
        run_checked(&self.runner, "git", &["push", remote, &refspec])?;
        Ok(())
    }
}
