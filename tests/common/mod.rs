// Shared fixtures for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};
use git_deploy::git::Git2Repository;
use git_deploy::process::RecordingRunner;
use tempfile::TempDir;

/// A throwaway repository on `main` with deterministic commit times
pub struct Fixture {
    pub dir: TempDir,
    pub repo: Repository,
    clock: i64,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut options = RepositoryInitOptions::new();
        options.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &options).unwrap();

        Fixture {
            dir,
            repo,
            clock: 1_700_000_000,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, file: &str, contents: &str) {
        fs::write(self.path().join(file), contents).unwrap();
    }

    pub fn stage(&self, file: &str) {
        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
    }

    /// Commit `file` with `parents`, optionally moving `update_ref`
    pub fn commit_with(
        &mut self,
        update_ref: Option<&str>,
        parents: &[Oid],
        file: &str,
        message: &str,
    ) -> Oid {
        self.write(file, message);
        self.stage(file);

        let tree_id = self.repo.index().unwrap().write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        self.clock += 60;
        let signature =
            Signature::new("Ana Lima", "ana@example.com", &Time::new(self.clock, 120)).unwrap();

        let parent_commits: Vec<_> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).unwrap())
            .collect();
        let parent_refs: Vec<_> = parent_commits.iter().collect();

        self.repo
            .commit(
                update_ref,
                &signature,
                &signature,
                message,
                &tree,
                &parent_refs,
            )
            .unwrap()
    }

    /// Commit on top of HEAD
    pub fn commit(&mut self, file: &str, message: &str) -> Oid {
        let parents: Vec<Oid> = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.target())
            .into_iter()
            .collect();
        self.commit_with(Some("HEAD"), &parents, file, message)
    }

    pub fn tag(&self, name: &str, oid: Oid) {
        let object = self.repo.find_object(oid, None).unwrap();
        self.repo.tag_lightweight(name, &object, false).unwrap();
    }

    pub fn checkout_new_branch(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo.branch(name, &head, false).unwrap();
        self.repo.set_head(&format!("refs/heads/{}", name)).unwrap();
    }

    /// Open through the crate with network commands recorded instead of run
    pub fn open(&self) -> Git2Repository<RecordingRunner> {
        Git2Repository::with_runner(
            Repository::open(self.path()).unwrap(),
            RecordingRunner::new(),
        )
    }
}
