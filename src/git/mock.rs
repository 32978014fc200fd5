use crate::domain::CommitRecord;
use crate::error::{DeployError, Result};
use crate::git::Repository;
use chrono::{DateTime, Duration, Utc};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// A call observed by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    IsClean,
    CurrentBranch,
    FetchTags { remote: String },
    ResolveRef(String),
    ListTags,
    CommitsBetween { from: Option<String>, to: String },
    CreateTag(String),
    PushTag { remote: String, name: String },
}

/// Mock repository with a linear history, for testing without actual git operations
pub struct MockRepository {
    /// Oldest first; the last commit is HEAD
    commits: Vec<CommitRecord>,
    tags: RefCell<HashMap<String, usize>>,
    /// Listed by `list_tags` but not found by `resolve_ref`
    unresolvable: HashSet<String>,
    branch: Option<String>,
    clean: bool,
    fail_fetch: bool,
    fail_push: bool,
    fail_resolve: bool,
    calls: RefCell<Vec<RepoCall>>,
}

impl MockRepository {
    /// Create a clean, empty mock repository on `main`
    pub fn new() -> Self {
        MockRepository {
            commits: Vec::new(),
            tags: RefCell::new(HashMap::new()),
            unresolvable: HashSet::new(),
            branch: Some("main".to_string()),
            clean: true,
            fail_fetch: false,
            fail_push: false,
            fail_resolve: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Append a commit on top of HEAD and return its long hash
    pub fn add_commit(&mut self, subject: &str, author: &str) -> String {
        let n = self.commits.len() + 1;
        let long_hash = format!("{:0>40x}", n * 0x1f2e3d);
        let base =
            (DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1_704_110_400)).fixed_offset();

        self.commits.push(CommitRecord::new(
            &long_hash[33..],
            long_hash.clone(),
            subject,
            author,
            base + Duration::days(n as i64),
        ));
        long_hash
    }

    /// Tag the current HEAD commit
    pub fn tag_head(&mut self, name: impl Into<String>) {
        if let Some(head) = self.commits.len().checked_sub(1) {
            self.tags.get_mut().insert(name.into(), head);
        }
    }

    pub fn set_branch(&mut self, branch: Option<&str>) {
        self.branch = branch.map(str::to_string);
    }

    pub fn set_clean(&mut self, clean: bool) {
        self.clean = clean;
    }

    pub fn fail_fetch(&mut self) {
        self.fail_fetch = true;
    }

    pub fn fail_push(&mut self) {
        self.fail_push = true;
    }

    /// Keep `name` in the tag list but make lookups of it find nothing
    pub fn unresolvable_tag(&mut self, name: impl Into<String>) {
        self.unresolvable.insert(name.into());
    }

    pub fn fail_resolve(&mut self) {
        self.fail_resolve = true;
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.borrow().clone()
    }

    /// True if any call modified local or remote state
    pub fn has_side_effects(&self) -> bool {
        self.calls.borrow().iter().any(|call| {
            matches!(
                call,
                RepoCall::FetchTags { .. } | RepoCall::CreateTag(_) | RepoCall::PushTag { .. }
            )
        })
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.borrow().contains_key(name)
    }

    fn record(&self, call: RepoCall) {
        self.calls.borrow_mut().push(call);
    }

    fn index_of(&self, reference: &str) -> Option<usize> {
        if reference == "HEAD" {
            return self.commits.len().checked_sub(1);
        }
        if let Some(index) = self.tags.borrow().get(reference) {
            return Some(*index);
        }
        self.commits.iter().position(|c| c.long_hash == reference)
    }

    fn command_error(args: String) -> DeployError {
        DeployError::Command {
            program: "git".to_string(),
            args,
            code: 1,
            stderr: "mock failure".to_string(),
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn is_clean(&self) -> Result<bool> {
        self.record(RepoCall::IsClean);
        Ok(self.clean)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        self.record(RepoCall::CurrentBranch);
        Ok(self.branch.clone())
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        self.record(RepoCall::FetchTags {
            remote: remote.to_string(),
        });
        if self.fail_fetch {
            return Err(Self::command_error(format!("fetch {} --tags --force", remote)));
        }
        Ok(())
    }

    fn resolve_ref(&self, reference: &str) -> Result<Option<String>> {
        self.record(RepoCall::ResolveRef(reference.to_string()));
        if self.fail_resolve {
            return Err(Self::command_error(format!("rev-parse {}", reference)));
        }
        if self.unresolvable.contains(reference) {
            return Ok(None);
        }
        Ok(self
            .index_of(reference)
            .map(|i| self.commits[i].long_hash.clone()))
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        self.record(RepoCall::ListTags);
        let mut tags: Vec<String> = self.tags.borrow().keys().cloned().collect();
        tags.sort();
        Ok(tags)
    }

    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitRecord>> {
        self.record(RepoCall::CommitsBetween {
            from: from.map(str::to_string),
            to: to.to_string(),
        });

        let end = self
            .index_of(to)
            .ok_or_else(|| DeployError::version(format!("Unknown revision: {}", to)))?;
        let start = match from {
            Some(from) => {
                self.index_of(from)
                    .ok_or_else(|| DeployError::version(format!("Unknown revision: {}", from)))?
                    + 1
            }
            None => 0,
        };

        Ok(self
            .commits
            .get(start..=end)
            .unwrap_or_default()
            .iter()
            .rev()
            .cloned()
            .collect())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        self.record(RepoCall::CreateTag(name.to_string()));
        let head = self
            .commits
            .len()
            .checked_sub(1)
            .ok_or_else(|| Self::command_error(format!("tag {}", name)))?;
        self.tags.borrow_mut().insert(name.to_string(), head);
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        self.record(RepoCall::PushTag {
            remote: remote.to_string(),
            name: name.to_string(),
        });
        if self.fail_push {
            return Err(Self::command_error(format!("push {} refs/tags/{}", remote, name)));
        }
        Ok(())
    }
}
