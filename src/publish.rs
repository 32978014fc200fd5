//! Release record publishing (GitHub releases via the `gh` CLI).

use std::cell::RefCell;

use tracing::info;

use crate::error::{DeployError, Result};
use crate::process::{CommandRunner, SystemRunner};

/// Creates the release entry that accompanies a pushed tag
pub trait ReleasePublisher {
    fn create_release(&self, tag: &str, title: &str, body: &str) -> Result<()>;
}

impl<T: ReleasePublisher + ?Sized> ReleasePublisher for &T {
    fn create_release(&self, tag: &str, title: &str, body: &str) -> Result<()> {
        (**self).create_release(tag, title, body)
    }
}

/// Publishes through `gh release create <tag> --notes <body> -t <title>`
pub struct GhPublisher<R: CommandRunner = SystemRunner> {
    program: String,
    runner: R,
}

impl<R: CommandRunner> GhPublisher<R> {
    pub fn new(program: impl Into<String>, runner: R) -> Self {
        GhPublisher {
            program: program.into(),
            runner,
        }
    }
}

impl<R: CommandRunner> ReleasePublisher for GhPublisher<R> {
    fn create_release(&self, tag: &str, title: &str, body: &str) -> Result<()> {
        info!(tag, program = %self.program, "creating release");

        let output = self.runner.run(
            &self.program,
            &["release", "create", tag, "--notes", body, "-t", title],
        )?;
        if !output.is_success() {
            return Err(DeployError::publish(format!(
                "{} release create {} exited with {}: {}",
                self.program,
                tag,
                output.status,
                output.stderr.trim()
            )));
        }
        Ok(())
    }
}

/// A release captured by [RecordingPublisher]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
    pub tag: String,
    pub title: String,
    pub body: String,
}

/// In-memory publisher for tests
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    releases: RefCell<Vec<PublishedRelease>>,
    fail: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        RecordingPublisher::default()
    }

    /// A publisher whose every call fails
    pub fn failing() -> Self {
        RecordingPublisher {
            releases: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn releases(&self) -> Vec<PublishedRelease> {
        self.releases.borrow().clone()
    }
}

impl ReleasePublisher for RecordingPublisher {
    fn create_release(&self, tag: &str, title: &str, body: &str) -> Result<()> {
        if self.fail {
            return Err(DeployError::publish(format!(
                "release {} rejected by remote",
                tag
            )));
        }
        self.releases.borrow_mut().push(PublishedRelease {
            tag: tag.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
