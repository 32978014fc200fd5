//! The release pipeline.
//!
//! ```text
//! CheckClean -> CheckBranch -> FetchTags -> ResolveLatest -> ResolveNext
//!    -> BuildChangelog -> DisplayAndConfirm -> {CreateAndPushTag -> PublishRelease} | Aborted
//! ```
//!
//! Every stage must succeed before the next one starts; the first error aborts
//! the run. Tag push and release publishing are two separate remote calls: if
//! publishing fails the tag stays pushed and [DeployError::PartialRelease] is
//! returned. Nothing is rolled back.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local};
use tracing::{debug, info};

use crate::boundary::BoundaryWarning;
use crate::changelog::{ChangelogDocument, ChangelogGenerator};
use crate::config::Config;
use crate::domain::{validate_namespace, BumpKind, SemverTag};
use crate::error::{DeployError, Result};
use crate::git::Repository;
use crate::preflight::Preflight;
use crate::publish::ReleasePublisher;
use crate::resolver::{LatestSource, LatestTag, VersionResolver};
use crate::ui::{self, Confirm, TerminalMarkdown};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CheckClean,
    CheckBranch,
    FetchTags,
    ResolveLatest,
    ResolveNext,
    BuildChangelog,
    DisplayAndConfirm,
    CreateAndPushTag,
    PublishRelease,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CheckClean => "check-clean",
            Stage::CheckBranch => "check-branch",
            Stage::FetchTags => "fetch-tags",
            Stage::ResolveLatest => "resolve-latest",
            Stage::ResolveNext => "resolve-next",
            Stage::BuildChangelog => "build-changelog",
            Stage::DisplayAndConfirm => "display-and-confirm",
            Stage::CreateAndPushTag => "create-and-push-tag",
            Stage::PublishRelease => "publish-release",
        };
        f.write_str(name)
    }
}

fn enter(stage: Stage) {
    debug!(stage = %stage, "entering stage");
}

/// What the operator asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOptions {
    pub bump: BumpKind,
    pub namespace: Option<String>,
    /// Stop after showing the changelog
    pub dry_run: bool,
}

impl ReleaseOptions {
    /// Validate raw CLI input; an empty namespace means "no namespace"
    pub fn parse(bump: &str, namespace: Option<&str>) -> Result<Self> {
        let bump = bump.parse::<BumpKind>()?;
        let namespace = match namespace.map(str::trim) {
            Some("") | None => None,
            Some(namespace) => {
                validate_namespace(namespace)?;
                Some(namespace.to_string())
            }
        };

        Ok(ReleaseOptions {
            bump,
            namespace,
            dry_run: false,
        })
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Repository-level release settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSettings {
    pub release_branches: Vec<String>,
    pub remote: String,
    pub tag_prefix: String,
    pub render_width: usize,
    pub publish: bool,
    pub publish_program: String,
}

impl ReleaseSettings {
    pub fn from_config(config: &Config) -> Self {
        ReleaseSettings {
            release_branches: config.release.branches.clone(),
            remote: config.release.remote.clone(),
            tag_prefix: config.release.tag_prefix.clone(),
            render_width: config.changelog.width,
            publish: config.publish.enabled,
            publish_program: config.publish.program.clone(),
        }
    }
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Everything decided for one release attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    pub bump: BumpKind,
    pub namespace: Option<String>,
    pub latest: LatestTag,
    pub next: SemverTag,
    pub changelog: ChangelogDocument,
    pub warnings: Vec<BoundaryWarning>,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Tag pushed; `published` is false when publishing is disabled
    Released { tag: String, published: bool },
    /// Operator answered "no"; nothing was changed
    Declined { tag: String },
    /// `--dry-run`; nothing was changed
    DryRun { tag: String },
}

/// Orchestrates preflight, resolution, changelog and the tag/publish commit
pub struct ReleaseDriver<G, P, C> {
    repo: G,
    publisher: P,
    confirm: C,
    generator: ChangelogGenerator,
    markdown: TerminalMarkdown,
    settings: ReleaseSettings,
    clock: fn() -> DateTime<FixedOffset>,
}

fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

impl<G: Repository, P: ReleasePublisher, C: Confirm> ReleaseDriver<G, P, C> {
    pub fn new(
        repo: G,
        publisher: P,
        confirm: C,
        generator: ChangelogGenerator,
        settings: ReleaseSettings,
    ) -> Result<Self> {
        let markdown = TerminalMarkdown::new(settings.render_width)?;
        Ok(ReleaseDriver {
            repo,
            publisher,
            confirm,
            generator,
            markdown,
            settings,
            clock: local_now,
        })
    }

    /// Replace the clock used to stamp changelog documents
    pub fn with_clock(mut self, clock: fn() -> DateTime<FixedOffset>) -> Self {
        self.clock = clock;
        self
    }

    pub fn repo(&self) -> &G {
        &self.repo
    }

    /// Run every stage up to and including the changelog
    pub fn prepare(&self, options: &ReleaseOptions) -> Result<ReleaseRequest> {
        let namespace = options.namespace.as_deref();
        let preflight = Preflight::new(
            &self.repo,
            &self.settings.release_branches,
            &self.settings.remote,
        );
        let resolver = VersionResolver::new(&self.repo, &self.settings.tag_prefix);
        let mut warnings = Vec::new();

        enter(Stage::CheckClean);
        preflight.ensure_clean()?;

        enter(Stage::CheckBranch);
        preflight.ensure_release_branch()?;

        enter(Stage::FetchTags);
        preflight.fetch_remote_tags()?;

        enter(Stage::ResolveLatest);
        let latest = resolver.resolve_latest(namespace)?;

        enter(Stage::ResolveNext);
        let next = resolver.compute_next(&latest.tag, options.bump, namespace);
        info!(latest = %latest.tag, next = %next, bump = %options.bump, "resolved versions");

        match &latest.source {
            LatestSource::Baseline => warnings.push(BoundaryWarning::FirstRelease {
                next_tag: next.to_string(),
            }),
            LatestSource::Fallback { namespace } => {
                warnings.push(BoundaryWarning::NamespaceFallback {
                    namespace: namespace.clone(),
                    fallback_tag: latest.tag.to_string(),
                })
            }
            LatestSource::Found => {}
        }

        enter(Stage::BuildChangelog);
        let head = self
            .repo
            .resolve_ref("HEAD")?
            .ok_or_else(|| DeployError::precondition("Repository has no commits to release"))?;
        let commits = self
            .generator
            .commits_in_range(&self.repo, latest.range_start(), &head)?;
        debug!(from = %latest.tag, until = %next, commits = commits.len(), "generating changelog");

        if commits.is_empty() {
            if let Some(start) = latest.range_start() {
                warnings.push(BoundaryWarning::NoNewCommits {
                    latest_tag: start.to_string(),
                });
            }
        }

        let changelog = self.generator.build(next.clone(), (self.clock)(), commits);

        Ok(ReleaseRequest {
            bump: options.bump,
            namespace: options.namespace.clone(),
            latest,
            next,
            changelog,
            warnings,
        })
    }

    /// Run the whole pipeline
    pub fn run(&self, options: &ReleaseOptions) -> Result<ReleaseOutcome> {
        let request = self.prepare(options)?;
        let tag = request.next.to_string();
        let body = self.generator.render(&request.changelog);

        enter(Stage::DisplayAndConfirm);
        for warning in &request.warnings {
            ui::display_boundary_warning(warning);
        }
        let previous = request.latest.range_start().map(|t| t.to_string());
        ui::display_proposed_tag(previous.as_deref(), &tag);
        ui::display_changelog(&self.markdown.render(&body));

        if options.dry_run {
            info!(tag = %tag, "dry run, stopping before confirmation");
            return Ok(ReleaseOutcome::DryRun { tag });
        }

        let approved = self
            .confirm
            .ask(&format!("Do you want to deploy: {} ?", tag), true)?;
        if !approved {
            info!(tag = %tag, "release declined");
            return Ok(ReleaseOutcome::Declined { tag });
        }

        self.commit(&request, &tag, &body)
    }

    /// Create and push the tag, then publish the release
    fn commit(&self, request: &ReleaseRequest, tag: &str, body: &str) -> Result<ReleaseOutcome> {
        enter(Stage::CreateAndPushTag);
        info!(tag, remote = %self.settings.remote, "creating and pushing tag");
        self.repo.create_tag(tag)?;
        self.repo.push_tag(&self.settings.remote, tag)?;
        ui::display_success(&format!(
            "Pushed tag {} to {}",
            tag, self.settings.remote
        ));

        if !self.settings.publish {
            debug!(tag, "publishing disabled");
            return Ok(ReleaseOutcome::Released {
                tag: tag.to_string(),
                published: false,
            });
        }

        enter(Stage::PublishRelease);
        if let Err(e) = self.publisher.create_release(tag, tag, body) {
            ui::display_manual_release_instruction(tag, &self.settings.publish_program);
            return Err(DeployError::PartialRelease {
                tag: tag.to_string(),
                source: Box::new(e),
            });
        }
        ui::display_success(&format!(
            "Published release {} ({} commits)",
            tag,
            request.changelog.commits.len()
        ));

        Ok(ReleaseOutcome::Released {
            tag: tag.to_string(),
            published: true,
        })
    }
}
